//! Top-level route configuration.

use axum::{
    Router,
    routing::{any, get},
};
use tower_http::services::ServeDir;

use crate::handlers::{self, features::feature_routers};
use crate::state::AppState;

/// Creates the application routes.
///
/// # Routes
///
/// ## Spreadsheets
/// - `GET /api/spreadsheet` - List or find by name
/// - `POST /api/spreadsheet` - Create
/// - `GET /api/spreadsheet/{id}` - Load metadata
/// - `PATCH /api/spreadsheet/{id}` - Patch metadata
/// - `DELETE /api/spreadsheet/{id}` - Delete
/// - `* /api/spreadsheet/{id}/{*rest}` - Cells, columns, rows and labels
///
/// ## Features
/// - `GET /api/{feature}` and `GET /api/{feature}/{name}` for every
///   [`Feature`](crate::provider::Feature)
///
/// ## System
/// - `GET /health`, `GET /_liveness`, `GET /_readiness`
///
/// Everything else is served from the static directory.
pub fn create_routes(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config().static_dir);

    Router::new()
        // Spreadsheet metadata
        .route(
            "/api/spreadsheet",
            get(handlers::list_handler).post(handlers::create_handler),
        )
        .route(
            "/api/spreadsheet/{id}",
            get(handlers::load_handler)
                .patch(handlers::patch_handler)
                .delete(handlers::delete_handler),
        )
        // Everything below a spreadsheet
        .route("/api/spreadsheet/{id}/{*rest}", any(handlers::engine_handler))
        // Provider catalogs
        .merge(feature_routers())
        // System
        .route("/health", get(handlers::health_handler))
        .route("/_liveness", get(handlers::liveness_handler))
        .route("/_readiness", get(handlers::readiness_handler))
        .fallback_service(static_files)
        .with_state(state)
}
