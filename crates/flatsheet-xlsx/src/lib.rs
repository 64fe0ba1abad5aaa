//! # flatsheet-xlsx
//!
//! XLSX (Office Open XML) extraction for flatsheet: container reading,
//! shared-string loading, and the per-worksheet classify/resolve pass.

pub mod error;
pub mod reader;
pub mod resolve;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use resolve::resolve_sheet;
