//! XLSX reader
//!
//! Streams the parts of an XLSX container into classified cells: shared
//! strings first, then each worksheet in workbook order. Classification
//! happens while streaming (pass 1); the resolution post-pass runs once the
//! sheet's shared-formula registry is complete.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::resolve::resolve_sheet;
use flatsheet_core::{classify_cell, Cell, RawCell, RawFormula, SharedFormulaRegistry};
use flatsheet_core::{Workbook, Worksheet};

/// Replace `_xHHHH_` sequences with the character they encode.
///
/// Worksheet strings store control characters (tab, LF, CR) this way, and
/// a literal underscore that would start a sequence is itself written as
/// `_x005f_`. Anything that does not scan as a full sequence stays
/// verbatim.
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(idx) = rest.find("_x") {
        out.push_str(&rest[..idx]);
        let candidate = &rest[idx..];

        // A full sequence is exactly "_x" + 4 hex digits + "_"; the hex
        // digits are ASCII, so byte offsets are char boundaries
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                out.push(c);
                rest = &candidate[7..];
            }
            None => {
                out.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX container
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let sheet_info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::new();

        for (name, r_id) in &sheet_info {
            let Some(path) = sheet_paths.get(r_id) else {
                return Err(XlsxError::MissingPart(format!(
                    "no worksheet part for sheet '{}' ({})",
                    name, r_id
                )));
            };

            // Group ids are worksheet-local: every sheet gets a fresh registry
            let mut registry = SharedFormulaRegistry::new();
            let cells = Self::read_sheet_cells(&mut archive, path, &mut registry)?;

            log::debug!(
                "sheet '{}': {} cells, {} shared-formula groups",
                name,
                cells.len(),
                registry.len()
            );

            let cells = resolve_sheet(cells, &registry, &shared_strings)?;
            workbook.sheets.push(Worksheet {
                name: name.clone(),
                cells,
            });
        }

        Ok(workbook)
    }

    /// Load the shared-string table.
    ///
    /// A workbook with no string cells simply omits the part, so a missing
    /// table is an empty one, not an error. Rich-text `<r>` runs collapse
    /// to their concatenated text; run formatting does not survive.
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"t" if in_si => {
                        in_t = true;
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"t" => {
                        in_t = false;
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    if let Ok(text) = e.unescape() {
                        current_string.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read workbook.xml to get sheet names and rIds
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    let mut name = None;
                    let mut r_id = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"r:id" => {
                                r_id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get worksheet part paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => {
                                id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"Target" => {
                                target = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"Type" => {
                                rel_type = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to the xl/ folder
                            let full_path = if let Some(stripped) = target.strip_prefix('/') {
                                stripped.to_string()
                            } else {
                                format!("xl/{}", target)
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Pass 1: stream one worksheet part into classified cells, in document
    /// order, accumulating shared-formula hosts into `registry`.
    fn read_sheet_cells<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        registry: &mut SharedFormulaRegistry,
    ) -> XlsxResult<Vec<Cell>> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut cells = Vec::new();

        let mut current: Option<RawCell> = None;
        let mut in_value = false;
        let mut in_formula = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"c" => {
                        current = Some(Self::parse_cell_attrs(&e)?);
                    }
                    b"v" if current.is_some() => {
                        in_value = true;
                    }
                    b"f" if current.is_some() => {
                        in_formula = true;
                        if let Some(cell) = current.as_mut() {
                            cell.formula = Some(Self::parse_formula_attrs(&e));
                        }
                    }
                    b"is" if current.is_some() => {
                        in_inline_str = true;
                    }
                    b"t" if in_inline_str => {
                        in_inline_text = true;
                    }
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    // Cell with no children (may still carry attributes)
                    b"c" => {
                        let raw = Self::parse_cell_attrs(&e)?;
                        cells.push(classify_cell(&raw, registry)?);
                    }
                    // Dependent shared formulas are usually written as
                    // <f t="shared" si="N"/> with no text
                    b"f" if current.is_some() => {
                        if let Some(cell) = current.as_mut() {
                            cell.formula = Some(Self::parse_formula_attrs(&e));
                        }
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(raw) = current.take() {
                            cells.push(classify_cell(&raw, registry)?);
                        }
                    }
                    b"v" => {
                        in_value = false;
                    }
                    b"f" => {
                        in_formula = false;
                    }
                    b"is" => {
                        in_inline_str = false;
                    }
                    b"t" if in_inline_str => {
                        in_inline_text = false;
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if let Some(cell) = current.as_mut() {
                        if in_value || in_inline_text {
                            if let Ok(text) = e.unescape() {
                                cell.value = Some(text.to_string());
                            }
                        } else if in_formula {
                            if let Ok(text) = e.unescape() {
                                if let Some(formula) = cell.formula.as_mut() {
                                    formula.text = text.to_string();
                                }
                            }
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(cells)
    }

    /// Extract r/t attributes from a `<c>` element
    fn parse_cell_attrs(e: &quick_xml::events::BytesStart<'_>) -> XlsxResult<RawCell> {
        let mut reference = None;
        let mut type_attr = None;

        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    reference = attr.unescape_value().ok().map(|s| s.to_string());
                }
                b"t" => {
                    type_attr = attr.unescape_value().ok().map(|s| s.to_string());
                }
                _ => {}
            }
        }

        let reference =
            reference.ok_or_else(|| XlsxError::Parse("cell without r attribute".into()))?;

        let mut raw = RawCell::new(reference);
        raw.type_attr = type_attr;
        Ok(raw)
    }

    /// Extract t/si/ref attributes from an `<f>` element
    fn parse_formula_attrs(e: &quick_xml::events::BytesStart<'_>) -> RawFormula {
        let mut formula = RawFormula::default();

        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"t" => {
                    formula.kind_attr = attr.unescape_value().ok().map(|s| s.to_string());
                }
                b"si" => {
                    formula.shared_index = attr.unescape_value().ok().map(|s| s.to_string());
                }
                b"ref" => {
                    formula.reference = attr.unescape_value().ok().map(|s| s.to_string());
                }
                _ => {}
            }
        }

        formula
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_excel_escapes() {
        assert_eq!(decode_excel_escapes("a_x000a_b"), "a\nb");
        assert_eq!(decode_excel_escapes("tab_x0009_here"), "tab\there");
        assert_eq!(decode_excel_escapes("under_x005f_score"), "under_score");
        // Not an escape: passed through
        assert_eq!(decode_excel_escapes("snake_case"), "snake_case");
        assert_eq!(decode_excel_escapes("_x00zz_"), "_x00zz_");
        // Truncated sequence, and a false start right before a real one
        assert_eq!(decode_excel_escapes("_x000a"), "_x000a");
        assert_eq!(decode_excel_escapes("_x_x000a_"), "_x\n");
    }
}
