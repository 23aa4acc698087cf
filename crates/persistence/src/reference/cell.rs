//! Cell reference and cell range parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style references
//! (`A1`, `$B$2`, `AA100`, `B2:C3`) and zero-indexed coordinates.
//!
//! # Examples
//!
//! ```
//! use tabulon_persistence::reference::CellReference;
//!
//! let cell: CellReference = "b3".parse().unwrap();
//! assert_eq!(cell.column().index(), 1);
//! assert_eq!(cell.row().index(), 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::column_row::{
    ColumnRange, ColumnReference, RowRange, RowReference, parse_digits, parse_letters,
};
use crate::error::ReferenceError;

static CELL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$?(?<letters>[A-Za-z]+)\$?(?<numbers>[0-9]+)$").expect("valid cell pattern")
});

/// A reference to a single cell.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellReference {
    column: ColumnReference,
    row: RowReference,
}

impl CellReference {
    /// Creates a cell reference from a column and a row.
    pub fn new(column: ColumnReference, row: RowReference) -> Self {
        Self { column, row }
    }

    /// Returns the column.
    pub fn column(&self) -> ColumnReference {
        self.column
    }

    /// Returns the row.
    pub fn row(&self) -> RowReference {
        self.row
    }

    /// Parses a cell reference, returning `None` if the text is not one.
    ///
    /// Columns past `XFD` and rows past `1048576` are not cell references,
    /// which is what lets `Label123` be a label name.
    pub fn try_parse(text: &str) -> Option<Self> {
        let caps = CELL_PATTERN.captures(text)?;
        let column = parse_letters(&caps["letters"])?;
        let row = parse_digits(&caps["numbers"])?;
        Some(Self::new(column, row))
    }

    /// Parses a cell reference.
    pub fn parse(text: &str) -> Result<Self, ReferenceError> {
        Self::try_parse(text).ok_or_else(|| ReferenceError::InvalidCell {
            text: text.to_string(),
        })
    }
}

impl FromStr for CellReference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CellReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

impl fmt::Debug for CellReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cell({})", self)
    }
}

/// An inclusive rectangle of cells, normalized so `begin` is the top-left.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CellRange {
    begin: CellReference,
    end: CellReference,
}

impl CellRange {
    /// Creates a range from any two opposite corners.
    pub fn new(a: CellReference, b: CellReference) -> Self {
        let columns = ColumnRange::new(a.column, b.column);
        let rows = RowRange::new(a.row, b.row);
        Self {
            begin: CellReference::new(columns.begin(), rows.begin()),
            end: CellReference::new(columns.end(), rows.end()),
        }
    }

    /// A range holding exactly one cell.
    pub fn single(cell: CellReference) -> Self {
        Self {
            begin: cell,
            end: cell,
        }
    }

    /// The range covering the entire sheet.
    pub fn all() -> Self {
        Self {
            begin: CellReference::new(ColumnReference::FIRST, RowReference::FIRST),
            end: CellReference::new(ColumnReference::LAST, RowReference::LAST),
        }
    }

    /// Returns the top-left cell.
    pub fn begin(&self) -> CellReference {
        self.begin
    }

    /// Returns the bottom-right cell.
    pub fn end(&self) -> CellReference {
        self.end
    }

    /// Returns `true` if the range holds a single cell.
    pub fn is_single(&self) -> bool {
        self.begin == self.end
    }

    /// Returns the columns this range spans.
    pub fn columns(&self) -> ColumnRange {
        ColumnRange::new(self.begin.column, self.end.column)
    }

    /// Returns the rows this range spans.
    pub fn rows(&self) -> RowRange {
        RowRange::new(self.begin.row, self.end.row)
    }

    /// Returns `true` if the cell lies inside this range.
    pub fn contains(&self, cell: &CellReference) -> bool {
        self.columns().contains(cell.column) && self.rows().contains(cell.row)
    }

    /// Returns the number of cells in the range.
    pub fn count(&self) -> u64 {
        let columns = u64::from(self.end.column.index() - self.begin.column.index()) + 1;
        let rows = u64::from(self.end.row.index() - self.begin.row.index()) + 1;
        columns * rows
    }

    /// Iterates every cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = CellReference> + '_ {
        let columns = self.begin.column.index()..=self.end.column.index();
        (self.begin.row.index()..=self.end.row.index()).flat_map(move |row| {
            columns.clone().filter_map(move |column| {
                Some(CellReference::new(
                    ColumnReference::new(column)?,
                    RowReference::new(row)?,
                ))
            })
        })
    }

    /// Parses `B2:C3`, or a single cell `B2`.
    pub fn parse(text: &str) -> Result<Self, ReferenceError> {
        let invalid = || ReferenceError::InvalidRange {
            text: text.to_string(),
        };
        match text.split_once(':') {
            Some((a, b)) => Ok(Self::new(
                CellReference::try_parse(a).ok_or_else(invalid)?,
                CellReference::try_parse(b).ok_or_else(invalid)?,
            )),
            None => CellReference::try_parse(text)
                .map(Self::single)
                .ok_or_else(invalid),
        }
    }
}

impl FromStr for CellRange {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.begin)
        } else {
            write!(f, "{}:{}", self.begin, self.end)
        }
    }
}

impl From<CellReference> for CellRange {
    fn from(cell: CellReference) -> Self {
        Self::single(cell)
    }
}

super::string_serde!(CellReference, CellRange);
