//! Health check endpoint handlers.
//!
//! Simple health checks for monitoring and load balancers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::error::RestResult;
use crate::state::AppState;

/// Handler for the health check endpoint.
///
/// # HTTP Request
///
/// `GET /health`
///
/// # Response
///
/// - `200 OK` - Server is healthy, with the number of cached spreadsheets
pub async fn health_handler(State(state): State<AppState>) -> RestResult<Response> {
    debug!("Processing health check request");

    let health_response = serde_json::json!({
        "status": "healthy",
        "spreadsheets": state.tenants().len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    Ok((StatusCode::OK, Json(health_response)).into_response())
}

/// Handler for the liveness check.
///
/// # HTTP Request
///
/// `GET /_liveness`
pub async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Handler for the readiness check.
///
/// Reads one page of metadata to check the store answers.
///
/// # HTTP Request
///
/// `GET /_readiness`
///
/// # Response
///
/// - `200 OK` - The metadata store answered
/// - `503 Service Unavailable` - The metadata store failed
pub async fn readiness_handler(State(state): State<AppState>) -> Response {
    debug!("Processing readiness check request");

    let (status, metadata) = match state.metadata().all(0, 1).await {
        Ok(_) => (StatusCode::OK, "ok".to_string()),
        Err(e) => {
            warn!(error = %e, "Metadata store not ready");
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
    };

    let response = serde_json::json!({
        "status": if status.is_success() { "ready" } else { "unavailable" },
        "checks": {
            "metadata": metadata
        }
    });

    (status, Json(response)).into_response()
}
