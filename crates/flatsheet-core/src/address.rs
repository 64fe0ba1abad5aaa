//! Cell address codec
//!
//! Conversions between A1-style notation (with optional `$` absolute markers)
//! and the zero-based `(col, row)` index pair used for offset arithmetic.

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "A1", "$B$2")
///
/// Column letters run A-XFD, row numbers 1-1048576. The optional `$` prefix
/// locks an axis against offsetting when a shared formula is materialized
/// for a dependent cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., XFD=16383)
    pub col: u16,
    /// Whether the row reference is absolute ($)
    pub row_absolute: bool,
    /// Whether the column reference is absolute ($)
    pub col_absolute: bool,
}

impl CellAddress {
    /// Create a new cell address with relative references
    pub fn new(row: u32, col: u16) -> Self {
        Self {
            row,
            col,
            row_absolute: false,
            col_absolute: false,
        }
    }

    /// Create a new cell address with specified absolute/relative flags
    pub fn with_absolute(row: u32, col: u16, row_absolute: bool, col_absolute: bool) -> Self {
        Self {
            row,
            col,
            row_absolute,
            col_absolute,
        }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// Case-insensitive; `$` markers are recorded per axis, not discarded.
    ///
    /// # Examples
    /// ```
    /// use flatsheet_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("B7").unwrap();
    /// assert_eq!(addr.row, 6);
    /// assert_eq!(addr.col, 1);
    ///
    /// let addr = CellAddress::parse("$A$1").unwrap();
    /// assert!(addr.row_absolute);
    /// assert!(addr.col_absolute);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;

        let col_absolute = if bytes.get(pos) == Some(&b'$') {
            pos += 1;
            true
        } else {
            false
        };

        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }

        if pos == col_start {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let col = Self::letters_to_column(&s[col_start..pos])?;

        let row_absolute = if bytes.get(pos) == Some(&b'$') {
            pos += 1;
            true
        } else {
            false
        };

        let row_str = &s[pos..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }

        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        // Rows are 1-based in notation, 0-based internally
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        let row = row - 1;

        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row as i64, MAX_ROWS - 1));
        }

        Ok(Self {
            row,
            col,
            row_absolute,
            col_absolute,
        })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u16) -> String {
        let mut result = String::new();
        let mut n = col as u32 + 1; // 1-based for calculation

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
            // Bounds-check each step: a long run of letters (a named range,
            // not a column) would overflow the accumulator otherwise
            if col > MAX_COLS as u32 {
                return Err(Error::ColumnOutOfBounds(col as i64 - 1, MAX_COLS - 1));
            }
        }

        Ok((col - 1) as u16) // Convert to 0-based
    }

    /// Shift this address by a signed per-axis delta.
    ///
    /// An axis marked absolute (`$`) is copied through unchanged; a relative
    /// axis moves by exactly the delta. Fails if the result leaves the grid.
    pub fn offset_by(&self, offset: &AddressOffset) -> Result<Self> {
        let col = if self.col_absolute {
            self.col
        } else {
            let shifted = self.col as i64 + offset.cols;
            if shifted < 0 || shifted >= MAX_COLS as i64 {
                return Err(Error::ColumnOutOfBounds(shifted, MAX_COLS - 1));
            }
            shifted as u16
        };

        let row = if self.row_absolute {
            self.row
        } else {
            let shifted = self.row as i64 + offset.rows;
            if shifted < 0 || shifted >= MAX_ROWS as i64 {
                return Err(Error::RowOutOfBounds(shifted, MAX_ROWS - 1));
            }
            shifted as u32
        };

        Ok(Self {
            row,
            col,
            row_absolute: self.row_absolute,
            col_absolute: self.col_absolute,
        })
    }

    /// Format as A1-style string, re-emitting `$` markers
    pub fn to_a1_string(&self) -> String {
        let mut result = String::new();

        if self.col_absolute {
            result.push('$');
        }
        result.push_str(&Self::column_to_letters(self.col));

        if self.row_absolute {
            result.push('$');
        }
        result.push_str(&(self.row + 1).to_string());

        result
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Signed per-axis difference between two addresses
///
/// Computed as `dependent - host` on each axis; pure value, no identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressOffset {
    /// Column delta
    pub cols: i64,
    /// Row delta
    pub rows: i64,
}

impl AddressOffset {
    /// The zero offset
    pub const ZERO: AddressOffset = AddressOffset { cols: 0, rows: 0 };

    /// Create an offset from explicit deltas
    pub fn new(cols: i64, rows: i64) -> Self {
        Self { cols, rows }
    }

    /// Compute the offset that carries `host` onto `dependent`
    pub fn between(host: &CellAddress, dependent: &CellAddress) -> Self {
        Self {
            cols: dependent.col as i64 - host.col as i64,
            rows: dependent.row as i64 - host.row as i64,
        }
    }

    /// True if both deltas are zero
    pub fn is_zero(&self) -> bool {
        self.cols == 0 && self.rows == 0
    }
}
