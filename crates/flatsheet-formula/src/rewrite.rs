//! Shared-formula reference rewriter
//!
//! A shared-formula group stores one literal formula on its host cell;
//! every other cell in the group only records the group id. This module
//! reconstructs a dependent cell's concrete formula by shifting each
//! relative cell/range reference in the host text by the host-to-dependent
//! address offset. Axes locked with `$` do not move, and the two endpoints
//! of a range are shifted independently.

use crate::error::{FormulaError, FormulaResult};
use crate::tokenizer::tokenize;
use flatsheet_core::{
    AddressOffset, CellAddress, Error, SharedFormulaRegistry, MAX_COLS, MAX_ROWS,
};

/// Materialize the concrete formula for a shared-formula dependent.
///
/// Looks up the group's host in the registry, computes the per-axis offset
/// from host to dependent, and rewrites every range operand in the host
/// text by that offset. All other tokens pass through verbatim.
pub fn resolve_shared(
    dependent: &CellAddress,
    group_id: u32,
    registry: &SharedFormulaRegistry,
) -> FormulaResult<String> {
    let entry = registry
        .get(group_id)
        .ok_or_else(|| FormulaError::UnknownSharedGroup {
            group_id,
            address: dependent.to_a1_string(),
        })?;

    let offset = AddressOffset::between(&entry.host_address, dependent);
    if offset.is_zero() {
        // The host's own cell: the formula is already concrete
        return Ok(entry.formula.clone());
    }

    rewrite_formula(&entry.formula, &offset)
}

/// Rewrite every range operand in `formula` by `offset`.
///
/// Token boundaries come from the tokenizer's exact text spans, so the
/// output is the input with only the shifted references changed.
pub fn rewrite_formula(formula: &str, offset: &AddressOffset) -> FormulaResult<String> {
    let tokens = tokenize(formula)?;

    let mut rewritten = String::with_capacity(formula.len());
    for token in &tokens {
        if token.is_range_operand() {
            rewritten.push_str(&offset_reference(&token.text, offset)?);
        } else {
            rewritten.push_str(&token.text);
        }
    }

    Ok(rewritten)
}

/// Offset a reference operand: a single address, an `A1:B2` range, or a
/// whole-column / whole-row range (`A:A`, `1:3`).
///
/// Range endpoints are offset independently and rejoined, so a range mixing
/// absolute and relative axes keeps each endpoint's own locks.
fn offset_reference(text: &str, offset: &AddressOffset) -> FormulaResult<String> {
    match text.split_once(':') {
        Some((start, end)) => Ok(format!(
            "{}:{}",
            offset_endpoint(start, offset)?,
            offset_endpoint(end, offset)?
        )),
        None => offset_address(text, offset),
    }
}

/// Offset one range endpoint.
///
/// A letters-only endpoint names a whole column and a digits-only endpoint
/// a whole row; each moves on its single axis unless `$`-locked. Everything
/// else is a full address.
fn offset_endpoint(text: &str, offset: &AddressOffset) -> FormulaResult<String> {
    let (absolute, body) = match text.strip_prefix('$') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let lock = if absolute { "$" } else { "" };

    if !body.is_empty() && body.bytes().all(|b| b.is_ascii_alphabetic()) {
        let col = CellAddress::letters_to_column(body)?;
        let col = if absolute {
            col
        } else {
            let shifted = col as i64 + offset.cols;
            if shifted < 0 || shifted >= MAX_COLS as i64 {
                return Err(Error::ColumnOutOfBounds(shifted, MAX_COLS - 1).into());
            }
            shifted as u16
        };
        return Ok(format!("{}{}", lock, CellAddress::column_to_letters(col)));
    }

    if !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()) {
        let row: u32 = body
            .parse()
            .ok()
            .filter(|r| *r >= 1)
            .ok_or_else(|| Error::InvalidAddress(format!("invalid row '{}'", text)))?;
        let row = row - 1; // 1-based notation, 0-based arithmetic
        let row = if absolute {
            row
        } else {
            let shifted = row as i64 + offset.rows;
            if shifted < 0 || shifted >= MAX_ROWS as i64 {
                return Err(Error::RowOutOfBounds(shifted, MAX_ROWS - 1).into());
            }
            shifted as u32
        };
        return Ok(format!("{}{}", lock, row + 1));
    }

    offset_address(text, offset)
}

/// Offset one address, honoring per-axis `$` locks.
pub fn offset_address(text: &str, offset: &AddressOffset) -> FormulaResult<String> {
    let address = CellAddress::parse(text)?;
    Ok(address.offset_by(offset)?.to_a1_string())
}
