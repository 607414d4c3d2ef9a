//! Cell addressing and column labels.
//!
//! Spreadsheet columns are labelled with a bijective base-26 scheme: there is
//! no zero digit, so `1 -> A`, `26 -> Z`, `27 -> AA`. Everything in this module
//! is 1-based, matching how the sheet sink and formula text see the world.
//!
//! # Examples
//!
//! ```
//! use sukuk_engine::engine::{column_label, CellAddr};
//!
//! assert_eq!(column_label(27), "AA");
//! let addr: CellAddr = "I28".parse().unwrap();
//! assert_eq!(addr.col, 9);
//! assert_eq!(addr.to_string(), "I28");
//! ```

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Convert a 1-based column number to its letters (1 -> A, 26 -> Z, 27 -> AA).
///
/// Zero has no label and yields an empty string.
pub fn column_label(n: usize) -> String {
    let mut result = String::new();
    let mut n = n as u128;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}

/// Inverse of [`column_label`]. Case-insensitive; `None` for empty input,
/// non-letters or overflow.
pub fn column_number(label: &str) -> Option<usize> {
    if label.is_empty() {
        return None;
    }
    let mut acc = 0usize;
    for c in label.bytes() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() - b'A') as usize + 1;
        acc = acc.checked_mul(26)?.checked_add(digit)?;
    }
    Some(acc)
}

/// A fixed cell position (1-based column and row).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CellAddr {
    pub row: u32,
    pub col: usize,
}

impl CellAddr {
    pub const fn new(col: usize, row: u32) -> CellAddr {
        CellAddr { row, col }
    }

    /// Parse A1 notation ("I28", "aa3"). Returns `None` when invalid.
    pub fn parse_a1(name: &str) -> Option<CellAddr> {
        let caps = a1_re().captures(name)?;
        let col = column_number(&caps["letters"])?;
        let row = caps["numbers"].parse::<u32>().ok()?;
        if row == 0 {
            return None;
        }
        Some(CellAddr::new(col, row))
    }
}

fn a1_re() -> &'static Regex {
    static A1_RE: OnceLock<Regex> = OnceLock::new();
    A1_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$").expect("A1 regex must compile")
    })
}

impl std::str::FromStr for CellAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_a1(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for CellAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_label(self.col), self.row)
    }
}

/// Maps logical iteration columns onto sheet columns.
///
/// Iteration `1` lands on `first_column`; columns to the left of it hold row
/// labels and anchor constants.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ColumnMapper {
    pub first_column: usize,
}

impl ColumnMapper {
    /// Column "I", where the reference layout starts its iterations.
    pub const DEFAULT_FIRST_COLUMN: usize = 9;

    pub const fn new(first_column: usize) -> ColumnMapper {
        ColumnMapper { first_column }
    }

    /// Sheet column number for logical iteration `column` (1-based).
    pub fn sheet_column(&self, column: usize) -> usize {
        self.first_column + column - 1
    }

    pub fn label(&self, column: usize) -> String {
        column_label(self.sheet_column(column))
    }
}

impl Default for ColumnMapper {
    fn default() -> Self {
        ColumnMapper::new(Self::DEFAULT_FIRST_COLUMN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_a1_overflow_returns_none() {
        let huge = format!("{}1", "Z".repeat(40));
        assert!(CellAddr::parse_a1(&huge).is_none());
    }

    #[test]
    fn test_column_label_handles_max_usize() {
        let letters = column_label(usize::MAX);
        assert!(!letters.is_empty());
        assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_mapper_default_starts_at_i() {
        let mapper = ColumnMapper::default();
        assert_eq!(mapper.label(1), "I");
        assert_eq!(mapper.label(2), "J");
        assert_eq!(mapper.label(19), "AA");
    }
}
