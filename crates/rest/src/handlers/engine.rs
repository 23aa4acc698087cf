//! Hands requests below a spreadsheet to the path dispatcher.

use axum::{
    body::to_bytes,
    extract::{Request, State},
    response::Response,
};
use tracing::debug;

use crate::error::{RestError, RestResult};
use crate::state::AppState;

/// Handler for `/api/spreadsheet/{id}/{*rest}`, any method.
///
/// The body is buffered up to the configured limit before dispatch.
pub async fn engine_handler(
    State(state): State<AppState>,
    request: Request,
) -> RestResult<Response> {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, state.config().max_body_size)
        .await
        .map_err(|e| RestError::bad_request(format!("Failed to read request body: {}", e)))?;

    debug!(method = %parts.method, path = %parts.uri.path(), "Dispatching spreadsheet request");
    state
        .dispatcher()
        .dispatch(parts.method, parts.uri.path(), parts.headers, body)
        .await
}
