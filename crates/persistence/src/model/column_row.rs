//! Column and row records.

use serde::{Deserialize, Serialize};

fn is_false(value: &bool) -> bool {
    !*value
}

/// Per-column state other than its size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadsheetColumn {
    /// Hidden columns are skipped by clients when rendering.
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
}

/// Per-row state other than its size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadsheetRow {
    /// Hidden rows are skipped by clients when rendering.
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
}
