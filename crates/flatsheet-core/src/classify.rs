//! Cell classifier
//!
//! Turns one [`RawCell`] record into a [`Cell`], deciding the content kind
//! from the declared type attribute and the shape of the `<f>` child. The
//! only side effect is registering shared-formula hosts: the registry entry
//! is how dependents find their formula text in the post-pass.

use crate::address::CellAddress;
use crate::cell::{Cell, CellContent, FormulaValue, RawCell};
use crate::error::{Error, Result};
use crate::registry::SharedFormulaRegistry;

/// Classify one raw cell record, registering shared-formula hosts as a side
/// effect.
///
/// Precedence: declared string type first, then value-only cells, then the
/// formula sub-type. A record whose declared type cannot be interpreted is
/// an error, never a silently defaulted cell.
pub fn classify_cell(raw: &RawCell, registry: &mut SharedFormulaRegistry) -> Result<Cell> {
    let address = CellAddress::parse(&raw.reference)?;

    // 1. Shared-string reference
    if raw.type_attr.as_deref() == Some("s") {
        let text = raw.value.as_deref().ok_or_else(|| Error::MalformedCell {
            address: raw.reference.clone(),
            reason: "string cell has no value element".into(),
        })?;
        let index: usize = text.parse().map_err(|_| Error::MalformedCell {
            address: raw.reference.clone(),
            reason: format!("shared-string index '{}' is not an integer", text),
        })?;
        return Ok(Cell::new(address, CellContent::PendingString(index)));
    }

    // 2. Inline / literal strings without a formula
    if raw.formula.is_none() {
        if matches!(raw.type_attr.as_deref(), Some("inlineStr") | Some("str")) {
            let text = raw.value.clone().unwrap_or_default();
            return Ok(Cell::new(address, CellContent::Text(text)));
        }
        return classify_value_cell(raw, address);
    }

    // 3. Formula cells, by the <f> sub-type attribute
    let formula = raw.formula.as_ref().unwrap();
    let result = formula_result(raw)?;

    match formula.kind_attr.as_deref() {
        Some("array") => Ok(Cell::new(
            address,
            CellContent::ArrayFormula {
                text: formula.text.clone(),
                result,
            },
        )),
        Some("shared") => {
            let si = formula
                .shared_index
                .as_deref()
                .ok_or_else(|| Error::MalformedCell {
                    address: raw.reference.clone(),
                    reason: "shared formula without si attribute".into(),
                })?;
            let group_id: u32 = si.parse().map_err(|_| Error::MalformedCell {
                address: raw.reference.clone(),
                reason: format!("shared-formula index '{}' is not an integer", si),
            })?;

            if formula.reference.is_some() {
                // Host: carries the literal text and the defining range
                if formula.text.is_empty() {
                    return Err(Error::MalformedCell {
                        address: raw.reference.clone(),
                        reason: "shared-formula host has no formula text".into(),
                    });
                }
                registry.insert(group_id, address, formula.text.clone())?;
                Ok(Cell::new(
                    address,
                    CellContent::Shared {
                        group_id,
                        host: true,
                        text: formula.text.clone(),
                        result,
                    },
                ))
            } else {
                Ok(Cell::new(
                    address,
                    CellContent::SharedPending { group_id, result },
                ))
            }
        }
        _ => Ok(Cell::new(
            address,
            CellContent::Formula {
                text: formula.text.clone(),
                result,
            },
        )),
    }
}

/// Classify a cell with no formula: a numeric literal, or empty.
fn classify_value_cell(raw: &RawCell, address: CellAddress) -> Result<Cell> {
    match raw.type_attr.as_deref() {
        None | Some("n") | Some("b") => {}
        // Stored error literal (e.g. "#N/A") with no formula behind it
        Some("e") => {
            let text = raw.value.clone().unwrap_or_default();
            return Ok(Cell::new(address, CellContent::Text(text)));
        }
        Some(_) => {
            return Err(Error::UnclassifiableCell {
                address: raw.reference.clone(),
            });
        }
    }

    match raw.value.as_deref() {
        Some(text) => {
            let number: f64 = text.parse().map_err(|_| Error::MalformedCell {
                address: raw.reference.clone(),
                reason: format!("value '{}' is not numeric", text),
            })?;
            Ok(Cell::new(address, CellContent::Number(number)))
        }
        None => Ok(Cell::new(address, CellContent::Empty)),
    }
}

/// Interpret the stored `<v>` result alongside a formula.
///
/// The declared type attribute is authoritative: a numeric-typed result that
/// fails to parse is malformed input, not a string.
fn formula_result(raw: &RawCell) -> Result<Option<FormulaValue>> {
    let Some(text) = raw.value.as_deref() else {
        return Ok(None);
    };

    match raw.type_attr.as_deref() {
        Some("str") | Some("e") => Ok(Some(FormulaValue::Text(text.to_string()))),
        Some("b") => {
            let truthy = text == "1" || text.eq_ignore_ascii_case("true");
            Ok(Some(FormulaValue::Number(if truthy { 1.0 } else { 0.0 })))
        }
        None | Some("n") => {
            let number: f64 = text.parse().map_err(|_| Error::MalformedCell {
                address: raw.reference.clone(),
                reason: format!("numeric formula result '{}' does not parse", text),
            })?;
            Ok(Some(FormulaValue::Number(number)))
        }
        // "s" cannot reach here: a shared-string typed cell classifies in
        // step 1, before its formula is even considered
        Some(_) => Err(Error::UnclassifiableCell {
            address: raw.reference.clone(),
        }),
    }
}
