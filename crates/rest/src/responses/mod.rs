//! Response formatting.
//!
//! Successful bodies are the canonical JSON of a [`Marshalled`] value, tagged
//! with its type name in the `X-Content-Type-Name` header.

mod headers;

pub use headers::{ResponseHeaders, X_CONTENT_TYPE_NAME};

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::marshall::Marshalled;

/// Builds a JSON response for `marshalled` with the given extra headers.
pub fn marshalled_response(
    status: StatusCode,
    marshalled: Marshalled,
    headers: ResponseHeaders,
) -> Response {
    let headers = headers.with_type_name(marshalled.type_name);
    (status, headers.to_header_map(), Json(marshalled.value)).into_response()
}
