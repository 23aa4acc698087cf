//! Error types for the spreadsheet REST API.
//!
//! Every failure a handler can produce ends up as a [`RestError`], which
//! renders itself as a small JSON body with the matching HTTP status.
//!
//! # Error Mapping
//!
//! Store errors from the persistence layer are translated in one place:
//!
//! | Store Error | HTTP Status | Code |
//! |-------------|-------------|------|
//! | NotFound / unknown label | 404 | not-found |
//! | Reference / Invalid / label cycle | 400 | invalid |
//! | Backend | 500 | exception |
//!
//! # Response Body
//!
//! ```json
//! {"status": 404, "code": "not-found", "message": "label not found: Total"}
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use tabulon_persistence::error::{ReferenceError, StoreError};

use crate::provider::ProviderError;

/// The primary error type for REST API operations.
#[derive(Debug)]
pub enum RestError {
    /// Nothing answers to the request (HTTP 404).
    NotFound {
        /// Error message.
        message: String,
    },

    /// Bad request - malformed path, selection or body (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Method not allowed (HTTP 405).
    MethodNotAllowed {
        /// The method that was attempted.
        method: String,
        /// The resource the method was attempted on.
        resource: String,
    },

    /// Unsupported media type (HTTP 415).
    UnsupportedMediaType {
        /// The unsupported content type.
        content_type: String,
    },

    /// Internal server error (HTTP 500).
    InternalError {
        /// Error message.
        message: String,
    },
}

impl RestError {
    /// Creates a [`RestError::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        RestError::NotFound {
            message: message.into(),
        }
    }

    /// Creates a [`RestError::BadRequest`].
    pub fn bad_request(message: impl Into<String>) -> Self {
        RestError::BadRequest {
            message: message.into(),
        }
    }

    /// Returns the HTTP status this error renders with.
    pub fn status(&self) -> StatusCode {
        match self {
            RestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RestError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            RestError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            RestError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            RestError::NotFound { .. } => "not-found",
            RestError::BadRequest { .. } => "invalid",
            RestError::MethodNotAllowed { .. } | RestError::UnsupportedMediaType { .. } => {
                "not-supported"
            }
            RestError::InternalError { .. } => "exception",
        }
    }

    fn message(&self) -> String {
        match self {
            RestError::NotFound { message }
            | RestError::BadRequest { message }
            | RestError::InternalError { message } => message.clone(),
            RestError::MethodNotAllowed { method, resource } => {
                format!("Method {} not allowed on {}", method, resource)
            }
            RestError::UnsupportedMediaType { content_type } => {
                format!("Content type '{}' is not supported", content_type)
            }
        }
    }
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::NotFound { message } => write!(f, "Not found: {}", message),
            RestError::BadRequest { message } => write!(f, "Bad request: {}", message),
            RestError::MethodNotAllowed { method, resource } => {
                write!(f, "Method {} not allowed on {}", method, resource)
            }
            RestError::UnsupportedMediaType { content_type } => {
                write!(f, "Unsupported media type: {}", content_type)
            }
            RestError::InternalError { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for RestError {}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = serde_json::json!({
            "status": status.as_u16(),
            "code": self.code(),
            "message": self.message(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for RestError {
    fn from(err: StoreError) -> Self {
        if err.is_missing_entry() {
            RestError::not_found(err.to_string())
        } else if err.is_invalid_input() {
            RestError::bad_request(err.to_string())
        } else {
            RestError::InternalError {
                message: err.to_string(),
            }
        }
    }
}

impl From<ReferenceError> for RestError {
    fn from(err: ReferenceError) -> Self {
        RestError::bad_request(err.to_string())
    }
}

impl From<ProviderError> for RestError {
    fn from(err: ProviderError) -> Self {
        RestError::bad_request(err.to_string())
    }
}

impl From<serde_json::Error> for RestError {
    fn from(err: serde_json::Error) -> Self {
        RestError::bad_request(format!("Invalid JSON: {}", err))
    }
}

/// Result type alias for REST operations.
pub type RestResult<T> = Result<T, RestError>;
