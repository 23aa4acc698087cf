//! Spreadsheet metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::SpreadsheetId;

/// Locale assigned to spreadsheets created without one.
pub const DEFAULT_LOCALE: &str = "en-AU";

/// Converter selector assigned to new spreadsheets.
pub const DEFAULT_CONVERTER: &str = "general";

/// Formatter selector assigned to new spreadsheets.
pub const DEFAULT_FORMATTER: &str = "general";

/// Per-spreadsheet settings and audit information.
///
/// The `locale`, `converter` and `formatter` selectors decide which
/// provider a spreadsheet's tenant context is built with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetMetadata {
    /// Assigned by the store on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SpreadsheetId>,

    /// Human readable name, not necessarily unique.
    #[serde(default)]
    pub name: String,

    /// BCP 47 language tag, e.g. `en-AU`.
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Converter selector.
    #[serde(default = "default_converter")]
    pub converter: String,

    /// Formatter selector.
    #[serde(default = "default_formatter")]
    pub formatter: String,

    /// The caller that created the spreadsheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,

    /// When the spreadsheet was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// When the metadata was last changed.
    #[serde(default = "Utc::now")]
    pub modified_at: DateTime<Utc>,

    /// The caller that last changed the metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<String>,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_converter() -> String {
    DEFAULT_CONVERTER.to_string()
}

fn default_formatter() -> String {
    DEFAULT_FORMATTER.to_string()
}

impl SpreadsheetMetadata {
    /// Creates unsaved metadata with default selectors.
    pub fn new(name: impl Into<String>, locale: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name: name.into(),
            locale: locale.into(),
            converter: default_converter(),
            formatter: default_formatter(),
            creator: None,
            created_at: now,
            modified_at: now,
            modified_by: None,
        }
    }

    /// Sets the id.
    pub fn with_id(mut self, id: SpreadsheetId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the creator, who is also the first modifier.
    pub fn with_creator(mut self, user: Option<String>) -> Self {
        self.modified_by = user.clone();
        self.creator = user;
        self
    }

    /// Records a modification by `user` at the current time.
    pub fn touch(&mut self, user: Option<String>) {
        self.modified_at = Utc::now();
        self.modified_by = user;
    }
}

impl Default for SpreadsheetMetadata {
    fn default() -> Self {
        Self::new("Untitled", DEFAULT_LOCALE)
    }
}
