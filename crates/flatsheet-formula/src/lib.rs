//! # flatsheet-formula
//!
//! Formula tokenizer and shared-formula reference rewriter.
//!
//! ## Example
//!
//! ```rust
//! use flatsheet_core::{CellAddress, SharedFormulaRegistry};
//! use flatsheet_formula::resolve_shared;
//!
//! let mut registry = SharedFormulaRegistry::new();
//! let host = CellAddress::parse("C3").unwrap();
//! registry.insert(0, host, "=A1+A2".into()).unwrap();
//!
//! let dependent = CellAddress::parse("D3").unwrap();
//! assert_eq!(resolve_shared(&dependent, 0, &registry).unwrap(), "=B1+B2");
//! ```

pub mod error;
pub mod rewrite;
pub mod tokenizer;

pub use error::{FormulaError, FormulaResult};
pub use rewrite::{offset_address, resolve_shared, rewrite_formula};
pub use tokenizer::{tokenize, OperandKind, Token, TokenKind};
