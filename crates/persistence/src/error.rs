//! Error types for the persistence layer.
//!
//! Errors are split by category so the HTTP layer can translate them to a
//! status code in one place: reference parsing problems, label resolution
//! problems, missing store entries and invalid input.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all store and engine operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reference or identifier parsing errors
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// Label resolution errors
    #[error(transparent)]
    Label(#[from] LabelError),

    /// A keyed store entry does not exist.
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// The value handed to a store or the engine is unacceptable.
    #[error("invalid {kind}: {message}")]
    Invalid { kind: &'static str, message: String },

    /// Anything the backing store itself failed at.
    #[error("store failure: {message}")]
    Backend { message: String },
}

impl StoreError {
    /// Creates a [`StoreError::NotFound`] for the given kind and key.
    pub fn not_found(kind: &'static str, key: impl ToString) -> Self {
        StoreError::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    /// Creates a [`StoreError::Invalid`] for the given kind.
    pub fn invalid(kind: &'static str, message: impl Into<String>) -> Self {
        StoreError::Invalid {
            kind,
            message: message.into(),
        }
    }

    /// Returns `true` if this error means "the addressed entry does not exist".
    ///
    /// Unknown labels belong to this category as well.
    pub fn is_missing_entry(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound { .. } | StoreError::Label(LabelError::NotFound { .. })
        )
    }

    /// Returns `true` if this error was caused by unacceptable client input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            StoreError::Reference(_)
                | StoreError::Invalid { .. }
                | StoreError::Label(LabelError::Cycle { .. })
        )
    }
}

/// Errors produced while parsing identifiers and references.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("invalid spreadsheet id \"{text}\"")]
    InvalidSpreadsheetId { text: String },

    #[error("invalid cell reference \"{text}\"")]
    InvalidCell { text: String },

    #[error("invalid column reference \"{text}\"")]
    InvalidColumn { text: String },

    #[error("invalid row reference \"{text}\"")]
    InvalidRow { text: String },

    #[error("invalid range \"{text}\"")]
    InvalidRange { text: String },

    #[error("invalid label name \"{text}\"")]
    InvalidLabel { text: String },

    #[error("invalid selection \"{text}\": {message}")]
    InvalidSelection { text: String, message: String },
}

/// Errors produced while resolving labels to references.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("label not found: {label}")]
    NotFound { label: String },

    #[error("label {label} refers back to itself")]
    Cycle { label: String },
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
