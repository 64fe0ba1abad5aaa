//! # flatsheet-core
//!
//! Cell model and shared-formula machinery for the flatsheet text dumper.
//!
//! This crate provides the pure (no I/O) pieces:
//! - [`CellAddress`] and [`AddressOffset`] - the address codec
//! - [`RawCell`] and [`classify_cell`] - raw record classification
//! - [`SharedFormulaRegistry`] - host tracking for shared-formula groups
//! - [`Worksheet`], [`Workbook`] - ordered output containers
//!
//! ## Example
//!
//! ```rust
//! use flatsheet_core::{classify_cell, CellContent, RawCell, SharedFormulaRegistry};
//!
//! let mut registry = SharedFormulaRegistry::new();
//! let mut raw = RawCell::new("A1");
//! raw.value = Some("42".into());
//!
//! let cell = classify_cell(&raw, &mut registry).unwrap();
//! assert_eq!(cell.content, CellContent::Number(42.0));
//! ```

pub mod address;
pub mod cell;
pub mod classify;
pub mod error;
pub mod registry;
pub mod worksheet;

// Re-exports for convenience
pub use address::{AddressOffset, CellAddress};
pub use cell::{Cell, CellContent, FormulaValue, RawCell, RawFormula};
pub use classify::classify_cell;
pub use error::{Error, Result};
pub use registry::{SharedFormulaEntry, SharedFormulaRegistry};
pub use worksheet::{Workbook, Worksheet};

/// Maximum number of rows in a worksheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet
pub const MAX_COLS: u16 = 16_384;
