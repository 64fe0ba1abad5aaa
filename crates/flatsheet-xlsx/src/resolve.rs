//! Worksheet resolution post-pass
//!
//! Runs after a sheet's cells are classified and its shared-formula
//! registry is complete: dependents get their concrete formula text, and
//! shared-string indices get their table entry. Order-insensitive; any
//! failure aborts the sheet rather than emit a partially resolved dump.

use crate::error::XlsxResult;
use flatsheet_core::{Cell, CellContent, Error, SharedFormulaRegistry};
use flatsheet_formula::resolve_shared;

/// Resolve all pending cells of one worksheet.
///
/// `SharedPending` becomes a concrete `Shared { host: false }` via the
/// reference rewriter; `PendingString` becomes `Text` via the shared-string
/// table. Everything else passes through untouched.
pub fn resolve_sheet(
    cells: Vec<Cell>,
    registry: &SharedFormulaRegistry,
    shared_strings: &[String],
) -> XlsxResult<Vec<Cell>> {
    cells
        .into_iter()
        .map(|cell| resolve_cell(cell, registry, shared_strings))
        .collect()
}

fn resolve_cell(
    cell: Cell,
    registry: &SharedFormulaRegistry,
    shared_strings: &[String],
) -> XlsxResult<Cell> {
    let content = match cell.content {
        CellContent::SharedPending { group_id, result } => {
            let text = resolve_shared(&cell.address, group_id, registry)?;
            CellContent::Shared {
                group_id,
                host: false,
                text,
                result,
            }
        }
        CellContent::PendingString(index) => {
            let text = shared_strings
                .get(index)
                .ok_or_else(|| Error::StringIndexOutOfRange {
                    address: cell.address.to_a1_string(),
                    index,
                    len: shared_strings.len(),
                })?;
            CellContent::Text(text.clone())
        }
        other => other,
    };

    Ok(Cell {
        address: cell.address,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::XlsxError;
    use flatsheet_core::{CellAddress, FormulaValue};
    use flatsheet_formula::FormulaError;
    use pretty_assertions::assert_eq;

    fn addr(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    #[test]
    fn test_resolves_dependents_and_strings() {
        let mut registry = SharedFormulaRegistry::new();
        registry.insert(0, addr("C3"), "A1+A2".into()).unwrap();

        let cells = vec![
            Cell::new(addr("B1"), CellContent::PendingString(2)),
            Cell::new(
                addr("C3"),
                CellContent::Shared {
                    group_id: 0,
                    host: true,
                    text: "A1+A2".into(),
                    result: Some(FormulaValue::Number(3.0)),
                },
            ),
            Cell::new(
                addr("D3"),
                CellContent::SharedPending {
                    group_id: 0,
                    result: Some(FormulaValue::Number(7.0)),
                },
            ),
        ];

        let strings = vec!["foo".to_string(), "bar".to_string(), "baz".to_string()];
        let resolved = resolve_sheet(cells, &registry, &strings).unwrap();

        assert_eq!(resolved[0].content, CellContent::Text("baz".into()));
        // Host untouched
        assert_eq!(
            resolved[1].content.formula_text().unwrap(),
            "A1+A2"
        );
        // Dependent materialized one column to the right
        assert_eq!(
            resolved[2].content,
            CellContent::Shared {
                group_id: 0,
                host: false,
                text: "B1+B2".into(),
                result: Some(FormulaValue::Number(7.0)),
            }
        );
        assert!(!resolved.iter().any(|c| c.content.is_pending()));
    }

    #[test]
    fn test_unknown_group_aborts_sheet() {
        let registry = SharedFormulaRegistry::new();
        let cells = vec![Cell::new(
            addr("D3"),
            CellContent::SharedPending {
                group_id: 5,
                result: None,
            },
        )];

        let err = resolve_sheet(cells, &registry, &[]).unwrap_err();
        assert!(matches!(
            err,
            XlsxError::Formula(FormulaError::UnknownSharedGroup { group_id: 5, .. })
        ));
    }

    #[test]
    fn test_string_index_out_of_range() {
        let registry = SharedFormulaRegistry::new();
        let cells = vec![Cell::new(addr("A1"), CellContent::PendingString(3))];
        let strings = vec!["only".to_string()];

        let err = resolve_sheet(cells, &registry, &strings).unwrap_err();
        assert!(matches!(
            err,
            XlsxError::Core(Error::StringIndexOutOfRange { index: 3, len: 1, .. })
        ));
    }
}
