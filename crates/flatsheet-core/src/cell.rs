//! Cell model
//!
//! [`RawCell`] is one `<c>` record exactly as the document stores it;
//! [`Cell`] is the classified form. Each [`CellContent`] variant carries
//! only the fields valid for its kind, so a missing required attribute is a
//! classification error, not a half-filled struct.

use crate::address::CellAddress;
use std::fmt;

/// One raw cell record as read from worksheet XML
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCell {
    /// Cell reference (the `r` attribute, e.g. "B7")
    pub reference: String,
    /// Declared cell type (the `t` attribute: "s", "str", "inlineStr", "n", ...)
    pub type_attr: Option<String>,
    /// Text of the `<v>` child (or the inline-string text)
    pub value: Option<String>,
    /// The `<f>` child, if any
    pub formula: Option<RawFormula>,
}

impl RawCell {
    /// Create a raw cell with just a reference
    pub fn new<S: Into<String>>(reference: S) -> Self {
        Self {
            reference: reference.into(),
            ..Default::default()
        }
    }
}

/// The `<f>` child of a raw cell record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFormula {
    /// Formula text (empty for shared-formula dependents)
    pub text: String,
    /// Formula sub-type (the `t` attribute: "array", "shared", or absent)
    pub kind_attr: Option<String>,
    /// Shared-formula group id (the `si` attribute, unparsed)
    pub shared_index: Option<String>,
    /// Defining range (the `ref` attribute; present only on hosts)
    pub reference: Option<String>,
}

/// The stored result of a formula from when the workbook was last saved
///
/// The declared cell type attribute decides the variant; a parse-success
/// heuristic does not.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormulaValue {
    /// Numeric result
    Number(f64),
    /// String result
    Text(String),
}

impl fmt::Display for FormulaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaValue::Number(n) => write!(f, "{}", n),
            FormulaValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Classified cell content
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellContent {
    /// No stored value
    Empty,

    /// Numeric literal
    Number(f64),

    /// Shared-string reference, not yet substituted from the table
    PendingString(usize),

    /// Resolved string (from the shared-string table or an inline string)
    Text(String),

    /// Ordinary formula
    Formula {
        /// Formula text, verbatim
        text: String,
        /// Stored result, if the document carried one
        result: Option<FormulaValue>,
    },

    /// Array formula host (stored verbatim, never expanded)
    ArrayFormula {
        text: String,
        result: Option<FormulaValue>,
    },

    /// Shared-formula cell with concrete formula text
    ///
    /// `host` is true for the one cell per group that carried the literal
    /// text; dependents reach this variant only via the post-pass.
    Shared {
        group_id: u32,
        host: bool,
        text: String,
        result: Option<FormulaValue>,
    },

    /// Shared-formula dependent awaiting resolution against the registry
    SharedPending {
        group_id: u32,
        result: Option<FormulaValue>,
    },
}

impl CellContent {
    /// True if this content still needs the post-pass
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            CellContent::PendingString(_) | CellContent::SharedPending { .. }
        )
    }

    /// Formula text, if this content carries one
    pub fn formula_text(&self) -> Option<&str> {
        match self {
            CellContent::Formula { text, .. }
            | CellContent::ArrayFormula { text, .. }
            | CellContent::Shared { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Stored formula result, if any
    pub fn result(&self) -> Option<&FormulaValue> {
        match self {
            CellContent::Formula { result, .. }
            | CellContent::ArrayFormula { result, .. }
            | CellContent::Shared { result, .. }
            | CellContent::SharedPending { result, .. } => result.as_ref(),
            _ => None,
        }
    }

    /// Short kind name, stable across releases (used by the text renderer)
    pub fn kind_name(&self) -> &'static str {
        match self {
            CellContent::Empty => "empty",
            CellContent::Number(_) => "value",
            CellContent::PendingString(_) | CellContent::Text(_) => "string",
            CellContent::Formula { .. } => "formula",
            CellContent::ArrayFormula { .. } => "array",
            CellContent::Shared { .. } | CellContent::SharedPending { .. } => "shared",
        }
    }
}

/// A classified cell: an address plus its content
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// Parsed address, immutable once classified
    pub address: CellAddress,
    /// Content variant
    pub content: CellContent,
}

impl Cell {
    /// Create a cell
    pub fn new(address: CellAddress, content: CellContent) -> Self {
        Self { address, content }
    }
}
