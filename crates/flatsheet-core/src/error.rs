//! Error types for flatsheet-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in flatsheet-core
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(i64, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(i64, u16),

    /// A raw cell record does not carry the attributes its declared type requires
    #[error("Malformed cell {address}: {reason}")]
    MalformedCell { address: String, reason: String },

    /// A raw cell record matches none of the known kinds
    #[error("Unclassifiable cell {address}")]
    UnclassifiableCell { address: String },

    /// Two host cells claimed the same shared-formula group
    #[error("Duplicate shared-formula group {group_id} (second host at {address})")]
    DuplicateSharedGroup { group_id: u32, address: String },

    /// Shared-string index exceeds the table bounds
    #[error("Cell {address}: shared-string index {index} out of range (table has {len} entries)")]
    StringIndexOutOfRange {
        address: String,
        index: usize,
        len: usize,
    },
}
