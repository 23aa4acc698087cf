//! Response header generation.

use axum::http::{HeaderMap, HeaderName, HeaderValue, header};

/// Header naming the type of a JSON response body.
pub const X_CONTENT_TYPE_NAME: HeaderName = HeaderName::from_static("x-content-type-name");

/// Builder for JSON response headers.
///
/// Generates:
/// - `X-Content-Type-Name` (the marshalled type)
/// - `Location` (for created spreadsheets)
/// - `Content-Language` (the tenant locale)
#[derive(Debug, Default)]
pub struct ResponseHeaders {
    type_name: Option<String>,
    location: Option<String>,
    content_language: Option<String>,
}

impl ResponseHeaders {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the type name.
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Sets the Location URL.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the Content-Language tag.
    pub fn with_content_language(mut self, tag: impl Into<String>) -> Self {
        self.content_language = Some(tag.into());
        self
    }

    /// Converts to an Axum HeaderMap, skipping values that are not valid
    /// header text.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let entries = [
            (X_CONTENT_TYPE_NAME, &self.type_name),
            (header::LOCATION, &self.location),
            (header::CONTENT_LANGUAGE, &self.content_language),
        ];

        for (name, value) in entries {
            if let Some(value) = value.as_deref().and_then(|v| HeaderValue::from_str(v).ok()) {
                headers.insert(name, value);
            }
        }
        headers
    }

    /// Returns the Location value.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}
