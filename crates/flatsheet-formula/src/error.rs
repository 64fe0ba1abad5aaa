//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while tokenizing or rewriting formulas
#[derive(Debug, Error)]
pub enum FormulaError {
    /// The tokenizer rejected the formula text
    #[error("Cannot tokenize formula '{formula}': {reason}")]
    Tokenize { formula: String, reason: String },

    /// A dependent cell references a shared-formula group with no host
    #[error("Cell {address}: no shared-formula host for group {group_id}")]
    UnknownSharedGroup { group_id: u32, address: String },

    /// Address codec error while offsetting a reference
    #[error("Address error: {0}")]
    Address(#[from] flatsheet_core::Error),
}
