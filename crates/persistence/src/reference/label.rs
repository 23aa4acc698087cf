//! Label names and label mappings.
//!
//! A label is a user-assigned name bound to a cell, a cell range or another
//! label. Labels can stand in for cell references anywhere a selection or a
//! formula accepts one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::cell::{CellRange, CellReference};
use crate::error::ReferenceError;

/// Longest accepted label name.
pub const MAX_LABEL_LENGTH: usize = 255;

/// A validated label name.
///
/// Label names start with a letter or `_`, continue with letters, digits,
/// `_` or `.`, and never parse as a cell reference.
///
/// # Examples
///
/// ```
/// use tabulon_persistence::reference::LabelName;
///
/// assert!(LabelName::parse("Total").is_ok());
/// assert!(LabelName::parse("Label123").is_ok());
/// assert!(LabelName::parse("B2").is_err());
/// assert!(LabelName::parse("1st").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabelName(String);

impl LabelName {
    /// Parses and validates a label name.
    pub fn parse(text: &str) -> Result<Self, ReferenceError> {
        if Self::is_valid(text) {
            Ok(Self(text.to_string()))
        } else {
            Err(ReferenceError::InvalidLabel {
                text: text.to_string(),
            })
        }
    }

    /// Returns `true` if the text is an acceptable label name.
    pub fn is_valid(text: &str) -> bool {
        let mut chars = text.chars();
        let Some(first) = chars.next() else {
            return false;
        };

        text.len() <= MAX_LABEL_LENGTH
            && (first.is_ascii_alphabetic() || first == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
            && CellReference::try_parse(text).is_none()
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for LabelName {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LabelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for LabelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label({})", self.0)
    }
}

/// What a label points at.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum LabelTarget {
    /// A single cell.
    Cell(CellReference),
    /// A rectangle of cells.
    Range(CellRange),
    /// Another label, resolved transitively.
    Label(LabelName),
}

impl LabelTarget {
    /// Parses a cell, a range or a label name, in that order.
    pub fn parse(text: &str) -> Result<Self, ReferenceError> {
        if let Some(cell) = CellReference::try_parse(text) {
            return Ok(LabelTarget::Cell(cell));
        }
        if text.contains(':') {
            return CellRange::parse(text).map(LabelTarget::Range);
        }
        LabelName::parse(text).map(LabelTarget::Label)
    }
}

impl FromStr for LabelTarget {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LabelTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelTarget::Cell(cell) => write!(f, "{}", cell),
            LabelTarget::Range(range) => write!(f, "{}", range),
            LabelTarget::Label(label) => write!(f, "{}", label),
        }
    }
}

/// The association between a label and its target.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct LabelMapping {
    /// The label being defined.
    pub label: LabelName,
    /// What the label refers to.
    pub reference: LabelTarget,
}

impl LabelMapping {
    /// Creates a mapping.
    pub fn new(label: LabelName, reference: LabelTarget) -> Self {
        Self { label, reference }
    }
}

super::string_serde!(LabelName, LabelTarget);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_names() {
        for text in ["Total", "_hidden", "a.b", "Label123", "XFE1", "Sales_2024"] {
            assert!(LabelName::is_valid(text), "{text:?} should be valid");
        }
        for text in ["", "A1", "b2", "1abc", "has space", "dash-ed", ".dot"] {
            assert!(!LabelName::is_valid(text), "{text:?} should be invalid");
        }
        assert!(!LabelName::is_valid(&"a".repeat(MAX_LABEL_LENGTH + 1)));
    }

    #[test]
    fn test_target_parse_order() {
        assert!(matches!(LabelTarget::parse("B2"), Ok(LabelTarget::Cell(_))));
        assert!(matches!(
            LabelTarget::parse("B2:C3"),
            Ok(LabelTarget::Range(_))
        ));
        assert!(matches!(
            LabelTarget::parse("Other"),
            Ok(LabelTarget::Label(_))
        ));
        assert!(LabelTarget::parse("B2:").is_err());
    }

    #[test]
    fn test_mapping_json() {
        let mapping = LabelMapping::new(
            LabelName::parse("Total").unwrap(),
            LabelTarget::parse("b2").unwrap(),
        );
        let json = serde_json::to_value(&mapping).unwrap();
        assert_eq!(json, serde_json::json!({"label": "Total", "reference": "B2"}));

        let back: LabelMapping = serde_json::from_value(json).unwrap();
        assert_eq!(back, mapping);
    }
}
