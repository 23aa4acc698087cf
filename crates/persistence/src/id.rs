//! Spreadsheet identifier type.
//!
//! This module defines the [`SpreadsheetId`] type, the key every tenant
//! (independently stored spreadsheet) is addressed by.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ReferenceError;

/// The longest accepted textual form: sixteen hexadecimal digits.
const MAX_HEX_DIGITS: usize = 16;

/// An opaque, totally ordered spreadsheet identifier.
///
/// The textual form is hexadecimal without a prefix. Parsing accepts either
/// case, displaying always produces lower case.
///
/// # Examples
///
/// ```
/// use tabulon_persistence::id::SpreadsheetId;
///
/// let id: SpreadsheetId = "1F".parse().unwrap();
/// assert_eq!(id.value(), 31);
/// assert_eq!(id.to_string(), "1f");
/// assert!("xyz".parse::<SpreadsheetId>().is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpreadsheetId(u64);

impl SpreadsheetId {
    /// Creates an identifier from its numeric value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Parses the hexadecimal form of an identifier.
    ///
    /// Signs, prefixes, whitespace and overlong tokens are rejected rather
    /// than normalized.
    pub fn parse(text: &str) -> Result<Self, ReferenceError> {
        let invalid = || ReferenceError::InvalidSpreadsheetId {
            text: text.to_string(),
        };

        if text.is_empty()
            || text.len() > MAX_HEX_DIGITS
            || !text.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(invalid());
        }

        u64::from_str_radix(text, 16).map(Self).map_err(|_| invalid())
    }
}

impl FromStr for SpreadsheetId {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SpreadsheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl fmt::Debug for SpreadsheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpreadsheetId({:x})", self.0)
    }
}

impl From<u64> for SpreadsheetId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Serialize for SpreadsheetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SpreadsheetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
