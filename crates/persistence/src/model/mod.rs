//! Documents stored per spreadsheet and exchanged over HTTP.

mod cell;
mod column_row;
mod delta;
mod metadata;

pub use cell::{SpreadsheetCell, SpreadsheetFormula, number_value};
pub use column_row::{SpreadsheetColumn, SpreadsheetRow};
pub use delta::SpreadsheetDelta;
pub use metadata::{
    DEFAULT_CONVERTER, DEFAULT_FORMATTER, DEFAULT_LOCALE, SpreadsheetMetadata,
};
