//! Column and row references.
//!
//! Columns use spreadsheet letters (`A`, `Z`, `AA`, … `XFD`), rows use
//! one-based numbers (`1` … `1048576`). Both are stored zero-based.

use std::fmt;
use std::str::FromStr;

use crate::error::ReferenceError;

/// Number of addressable columns (`A` through `XFD`).
pub const MAX_COLUMNS: u32 = 16_384;

/// Number of addressable rows.
pub const MAX_ROWS: u32 = 1_048_576;

/// A zero-based column index.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnReference(u32);

impl ColumnReference {
    /// Column `A`.
    pub const FIRST: ColumnReference = ColumnReference(0);

    /// Column `XFD`.
    pub const LAST: ColumnReference = ColumnReference(MAX_COLUMNS - 1);

    /// Creates a column reference, returning `None` when out of bounds.
    pub fn new(index: u32) -> Option<Self> {
        (index < MAX_COLUMNS).then_some(Self(index))
    }

    /// Returns the zero-based index.
    pub fn index(&self) -> u32 {
        self.0
    }

    /// Parses column letters (case-insensitive, optional `$` prefix).
    pub fn parse(text: &str) -> Result<Self, ReferenceError> {
        parse_letters(text.strip_prefix('$').unwrap_or(text)).ok_or_else(|| {
            ReferenceError::InvalidColumn {
                text: text.to_string(),
            }
        })
    }

    /// Convert a column index to letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn letters(&self) -> String {
        let mut result = String::new();
        let mut n = self.0 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }
}

/// Converts letters to a column, rejecting anything past `XFD`.
pub(crate) fn parse_letters(letters: &str) -> Option<ColumnReference> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }

    let mut acc = 0u32;
    for c in letters.bytes() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        acc = acc * 26 + u32::from(c.to_ascii_uppercase() - b'A') + 1;
    }
    ColumnReference::new(acc - 1)
}

impl FromStr for ColumnReference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ColumnReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letters())
    }
}

impl fmt::Debug for ColumnReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Column({})", self)
    }
}

/// A zero-based row index, displayed one-based.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowReference(u32);

impl RowReference {
    /// Row `1`.
    pub const FIRST: RowReference = RowReference(0);

    /// Row `1048576`.
    pub const LAST: RowReference = RowReference(MAX_ROWS - 1);

    /// Creates a row reference, returning `None` when out of bounds.
    pub fn new(index: u32) -> Option<Self> {
        (index < MAX_ROWS).then_some(Self(index))
    }

    /// Returns the zero-based index.
    pub fn index(&self) -> u32 {
        self.0
    }

    /// Parses a one-based row number (optional `$` prefix).
    pub fn parse(text: &str) -> Result<Self, ReferenceError> {
        parse_digits(text.strip_prefix('$').unwrap_or(text)).ok_or_else(|| {
            ReferenceError::InvalidRow {
                text: text.to_string(),
            }
        })
    }
}

/// Converts a one-based row number, rejecting zero, signs and overflow.
pub(crate) fn parse_digits(digits: &str) -> Option<RowReference> {
    if digits.is_empty() || digits.len() > 7 || !digits.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let number: u32 = digits.parse().ok()?;
    RowReference::new(number.checked_sub(1)?)
}

impl FromStr for RowReference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RowReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0 + 1)
    }
}

impl fmt::Debug for RowReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row({})", self)
    }
}

/// An inclusive, normalized range of columns such as `A:C`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ColumnRange {
    begin: ColumnReference,
    end: ColumnReference,
}

impl ColumnRange {
    /// Creates a range, swapping the bounds if needed.
    pub fn new(a: ColumnReference, b: ColumnReference) -> Self {
        Self {
            begin: a.min(b),
            end: a.max(b),
        }
    }

    /// Returns the leftmost column.
    pub fn begin(&self) -> ColumnReference {
        self.begin
    }

    /// Returns the rightmost column.
    pub fn end(&self) -> ColumnReference {
        self.end
    }

    /// Returns `true` if the column lies within this range.
    pub fn contains(&self, column: ColumnReference) -> bool {
        self.begin <= column && column <= self.end
    }

    /// Parses `A:C` or a single column `B`.
    pub fn parse(text: &str) -> Result<Self, ReferenceError> {
        let invalid = || ReferenceError::InvalidRange {
            text: text.to_string(),
        };
        match text.split_once(':') {
            Some((a, b)) => Ok(Self::new(
                ColumnReference::parse(a).map_err(|_| invalid())?,
                ColumnReference::parse(b).map_err(|_| invalid())?,
            )),
            None => {
                let column = ColumnReference::parse(text).map_err(|_| invalid())?;
                Ok(Self::new(column, column))
            }
        }
    }
}

impl FromStr for ColumnRange {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ColumnRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.begin == self.end {
            write!(f, "{}", self.begin)
        } else {
            write!(f, "{}:{}", self.begin, self.end)
        }
    }
}

/// An inclusive, normalized range of rows such as `1:3`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RowRange {
    begin: RowReference,
    end: RowReference,
}

impl RowRange {
    /// Creates a range, swapping the bounds if needed.
    pub fn new(a: RowReference, b: RowReference) -> Self {
        Self {
            begin: a.min(b),
            end: a.max(b),
        }
    }

    /// Returns the top row.
    pub fn begin(&self) -> RowReference {
        self.begin
    }

    /// Returns the bottom row.
    pub fn end(&self) -> RowReference {
        self.end
    }

    /// Returns `true` if the row lies within this range.
    pub fn contains(&self, row: RowReference) -> bool {
        self.begin <= row && row <= self.end
    }

    /// Parses `1:3` or a single row `2`.
    pub fn parse(text: &str) -> Result<Self, ReferenceError> {
        let invalid = || ReferenceError::InvalidRange {
            text: text.to_string(),
        };
        match text.split_once(':') {
            Some((a, b)) => Ok(Self::new(
                RowReference::parse(a).map_err(|_| invalid())?,
                RowReference::parse(b).map_err(|_| invalid())?,
            )),
            None => {
                let row = RowReference::parse(text).map_err(|_| invalid())?;
                Ok(Self::new(row, row))
            }
        }
    }
}

impl FromStr for RowRange {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.begin == self.end {
            write!(f, "{}", self.begin)
        } else {
            write!(f, "{}:{}", self.begin, self.end)
        }
    }
}

super::string_serde!(ColumnReference, RowReference, ColumnRange, RowRange);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(ColumnReference::parse("A").unwrap().index(), 0);
        assert_eq!(ColumnReference::parse("z").unwrap().index(), 25);
        assert_eq!(ColumnReference::parse("AA").unwrap().index(), 26);
        assert_eq!(ColumnReference::parse("$B").unwrap().index(), 1);
        assert_eq!(ColumnReference::parse("XFD").unwrap().index(), MAX_COLUMNS - 1);
        assert_eq!(ColumnReference::new(27).unwrap().to_string(), "AB");
    }

    #[test]
    fn test_column_out_of_bounds() {
        assert!(ColumnReference::parse("XFE").is_err());
        assert!(ColumnReference::parse("ABCD").is_err());
        assert!(ColumnReference::parse("").is_err());
        assert!(ColumnReference::parse("A1").is_err());
        assert!(ColumnReference::new(MAX_COLUMNS).is_none());
    }

    #[test]
    fn test_rows() {
        assert_eq!(RowReference::parse("1").unwrap().index(), 0);
        assert_eq!(RowReference::parse("1048576").unwrap().index(), MAX_ROWS - 1);
        assert!(RowReference::parse("0").is_err());
        assert!(RowReference::parse("1048577").is_err());
        assert!(RowReference::parse("-1").is_err());
        assert!(RowReference::parse("+1").is_err());
        assert_eq!(RowReference::new(4).unwrap().to_string(), "5");
    }

    #[test]
    fn test_ranges_normalize() {
        let range = ColumnRange::parse("C:A").unwrap();
        assert_eq!(range.to_string(), "A:C");
        assert!(range.contains(ColumnReference::parse("B").unwrap()));
        assert!(!range.contains(ColumnReference::parse("D").unwrap()));

        let rows = RowRange::parse("3:1").unwrap();
        assert_eq!(rows.to_string(), "1:3");
        assert_eq!(RowRange::parse("7").unwrap().to_string(), "7");
        assert!(RowRange::parse("1:x").is_err());
    }
}
