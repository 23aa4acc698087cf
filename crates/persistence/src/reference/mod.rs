//! Spreadsheet references.
//!
//! This module defines how cells, columns, rows, ranges and labels are
//! addressed, both in URL paths and inside JSON documents:
//!
//! - [`CellReference`] - `B2`
//! - [`CellRange`] - `B2:C3`
//! - [`ColumnReference`] / [`ColumnRange`] - `B`, `A:C`
//! - [`RowReference`] / [`RowRange`] - `2`, `1:3`
//! - [`LabelName`], [`LabelTarget`], [`LabelMapping`] - named references
//!
//! Every type serializes as its canonical text, so references can be used as
//! JSON object keys.

mod cell;
mod column_row;
mod label;

pub use cell::{CellRange, CellReference};
pub use column_row::{
    ColumnRange, ColumnReference, MAX_COLUMNS, MAX_ROWS, RowRange, RowReference,
};
pub use label::{LabelMapping, LabelName, LabelTarget, MAX_LABEL_LENGTH};

/// Implements string-based serde for types with `Display` + `FromStr`.
macro_rules! string_serde {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl serde::Serialize for $ty {
                fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }

            impl<'de> serde::Deserialize<'de> for $ty {
                fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let text = <String as serde::Deserialize>::deserialize(deserializer)?;
                    text.parse().map_err(serde::de::Error::custom)
                }
            }
        )+
    };
}

pub(crate) use string_serde;
