//! End-to-end reader tests against in-memory XLSX fixtures.
//!
//! Each test assembles the exact OPC parts it needs with `zip::ZipWriter`,
//! then reads the archive back with `XlsxReader` and asserts on the
//! resolved cells.

use std::io::{Cursor, Write};

use flatsheet_core::{CellContent, FormulaValue};
use flatsheet_xlsx::{XlsxError, XlsxReader};
use pretty_assertions::assert_eq;
use zip::write::SimpleFileOptions;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
</Types>"#;

const SHARED_STRINGS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="3" uniqueCount="3">
<si><t>foo</t></si>
<si><r><t>b</t></r><r><t>ar</t></r></si>
<si><t>baz</t></si>
</sst>"#;

const SHEET1: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1">
<c r="A1" t="s"><v>2</v></c>
<c r="B1"><v>1.5</v></c>
<c r="C1" t="inlineStr"><is><t>inline</t></is></c>
</row>
<row r="3">
<c r="C3"><f t="shared" ref="C3:E3" si="0">A1+A2</f><v>3</v></c>
<c r="D3"><f t="shared" si="0"/><v>7</v></c>
<c r="E3"><f t="shared" si="0"/><v>9</v></c>
</row>
<row r="4">
<c r="F4"><f>SUM(A1:A3)</f><v>10</v></c>
<c r="G4" t="str"><f>TEXT(B1,"0")</f><v>2</v></c>
<c r="H4"><f t="array" ref="H4:H5">A1:A2*2</f></c>
<c r="I4"/>
</row>
</sheetData>
</worksheet>"#;

// Same group id as sheet 1, different host: registries must not leak
// across worksheets.
const SHEET2: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="2">
<c r="B2"><f t="shared" ref="B2:B3" si="0">$A$1+A1</f><v>2</v></c>
</row>
<row r="3">
<c r="B3"><f t="shared" si="0"/><v>3</v></c>
</row>
</sheetData>
</worksheet>"#;

fn workbook_xml(sheet_count: usize) -> String {
    let mut sheets = String::new();
    for i in 1..=sheet_count {
        sheets.push_str(&format!(
            r#"<sheet name="Sheet{i}" sheetId="{i}" r:id="rId{i}"/>"#
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>{sheets}</sheets>
</workbook>"#
    )
}

fn workbook_rels(sheet_count: usize) -> String {
    let mut rels = String::new();
    for i in 1..=sheet_count {
        rels.push_str(&format!(
            r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
    )
}

/// Assemble an xlsx archive in memory from (path, contents) parts
fn build_archive(parts: &[(&str, &str)]) -> Cursor<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (path, contents) in parts {
        writer.start_file(path.to_string(), options).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }

    writer.finish().unwrap()
}

fn fixture_workbook() -> Cursor<Vec<u8>> {
    build_archive(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("xl/workbook.xml", &workbook_xml(2)),
        ("xl/_rels/workbook.xml.rels", &workbook_rels(2)),
        ("xl/sharedStrings.xml", SHARED_STRINGS),
        ("xl/worksheets/sheet1.xml", SHEET1),
        ("xl/worksheets/sheet2.xml", SHEET2),
    ])
}

fn content_at<'a>(
    sheet: &'a flatsheet_core::Worksheet,
    address: &str,
) -> &'a CellContent {
    &sheet
        .cells
        .iter()
        .find(|c| c.address.to_a1_string() == address)
        .unwrap_or_else(|| panic!("no cell {address}"))
        .content
}

#[test]
fn test_reads_values_and_strings() {
    let workbook = XlsxReader::read(fixture_workbook()).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    assert_eq!(content_at(sheet, "A1"), &CellContent::Text("baz".into()));
    assert_eq!(content_at(sheet, "B1"), &CellContent::Number(1.5));
    assert_eq!(content_at(sheet, "C1"), &CellContent::Text("inline".into()));
    assert_eq!(content_at(sheet, "I4"), &CellContent::Empty);
}

#[test]
fn test_shared_formulas_materialized() {
    let workbook = XlsxReader::read(fixture_workbook()).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    assert_eq!(
        content_at(sheet, "C3"),
        &CellContent::Shared {
            group_id: 0,
            host: true,
            text: "A1+A2".into(),
            result: Some(FormulaValue::Number(3.0)),
        }
    );
    assert_eq!(
        content_at(sheet, "D3"),
        &CellContent::Shared {
            group_id: 0,
            host: false,
            text: "B1+B2".into(),
            result: Some(FormulaValue::Number(7.0)),
        }
    );
    assert_eq!(
        content_at(sheet, "E3"),
        &CellContent::Shared {
            group_id: 0,
            host: false,
            text: "C1+C2".into(),
            result: Some(FormulaValue::Number(9.0)),
        }
    );
    assert!(!sheet.has_pending_cells());
}

#[test]
fn test_plain_array_and_string_formulas() {
    let workbook = XlsxReader::read(fixture_workbook()).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    assert_eq!(
        content_at(sheet, "F4"),
        &CellContent::Formula {
            text: "SUM(A1:A3)".into(),
            result: Some(FormulaValue::Number(10.0)),
        }
    );
    // Declared "str" type keeps the stored "2" a string result
    assert_eq!(
        content_at(sheet, "G4"),
        &CellContent::Formula {
            text: "TEXT(B1,\"0\")".into(),
            result: Some(FormulaValue::Text("2".into())),
        }
    );
    assert_eq!(
        content_at(sheet, "H4"),
        &CellContent::ArrayFormula {
            text: "A1:A2*2".into(),
            result: None,
        }
    );
}

#[test]
fn test_registry_is_reset_per_sheet() {
    let workbook = XlsxReader::read(fixture_workbook()).unwrap();
    assert_eq!(workbook.sheet_count(), 2);

    // Sheet 2 reuses group id 0 with its own host; the absolute axis holds
    let sheet = workbook.worksheet(1).unwrap();
    assert_eq!(
        content_at(sheet, "B3"),
        &CellContent::Shared {
            group_id: 0,
            host: false,
            text: "$A$1+A2".into(),
            result: Some(FormulaValue::Number(3.0)),
        }
    );
}

#[test]
fn test_read_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.xlsx");
    std::fs::write(&path, fixture_workbook().into_inner()).unwrap();

    let workbook = XlsxReader::read_file(&path).unwrap();
    assert_eq!(workbook.sheet_count(), 2);
    assert_eq!(workbook.worksheet_by_name("Sheet2").unwrap().cell_count(), 2);
}

#[test]
fn test_missing_content_types_is_invalid() {
    let archive = build_archive(&[("xl/workbook.xml", &workbook_xml(0))]);
    assert!(matches!(
        XlsxReader::read(archive),
        Err(XlsxError::InvalidFormat(_))
    ));
}

#[test]
fn test_missing_workbook_part() {
    let archive = build_archive(&[("[Content_Types].xml", CONTENT_TYPES)]);
    assert!(matches!(
        XlsxReader::read(archive),
        Err(XlsxError::MissingPart(_))
    ));
}

#[test]
fn test_dependent_without_host_fails() {
    let sheet = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="3"><c r="D3"><f t="shared" si="5"/><v>7</v></c></row>
</sheetData>
</worksheet>"#;

    let archive = build_archive(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("xl/workbook.xml", &workbook_xml(1)),
        ("xl/_rels/workbook.xml.rels", &workbook_rels(1)),
        ("xl/worksheets/sheet1.xml", sheet),
    ]);

    assert!(matches!(
        XlsxReader::read(archive),
        Err(XlsxError::Formula(_))
    ));
}

#[test]
fn test_string_index_out_of_range_fails() {
    let sheet = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1"><c r="A1" t="s"><v>9</v></c></row>
</sheetData>
</worksheet>"#;

    let archive = build_archive(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("xl/workbook.xml", &workbook_xml(1)),
        ("xl/_rels/workbook.xml.rels", &workbook_rels(1)),
        ("xl/sharedStrings.xml", SHARED_STRINGS),
        ("xl/worksheets/sheet1.xml", sheet),
    ]);

    assert!(matches!(
        XlsxReader::read(archive),
        Err(XlsxError::Core(
            flatsheet_core::Error::StringIndexOutOfRange { index: 9, .. }
        ))
    ));
}
