//! # tabulon-rest - HTTP front door for a multi-spreadsheet server
//!
//! This crate serves many independent spreadsheets from one process. Each
//! spreadsheet is addressed by a hex id in the URL and gets its own tenant
//! context: its metadata, its stores, the providers its locale selects and
//! a marshall context that resolves labels in patch documents.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tabulon_rest::{ServerConfig, create_app_with_config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::default();
//!     let app = create_app_with_config(config.clone());
//!
//!     let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Interaction | HTTP Method | URL Pattern |
//! |------------|-------------|-------------|
//! | list / find | GET | `/api/spreadsheet?name=` |
//! | create | POST | `/api/spreadsheet` |
//! | load / patch / delete | GET / PATCH / DELETE | `/api/spreadsheet/{id}` |
//! | cells | any | `/api/spreadsheet/{id}/cell/{selection}/{relation}` |
//! | columns, rows | any | `/api/spreadsheet/{id}/column/A:C`, `.../row/1:3` |
//! | labels | any | `/api/spreadsheet/{id}/label/{name}` |
//! | providers | GET | `/api/{feature}` and `/api/{feature}/{name}` |
//! | health | GET | `/health`, `/_liveness`, `/_readiness` |
//!
//! Anything else is looked up in the static file directory.
//!
//! ## HTTP Headers
//!
//! - `Content-Type` - PATCH bodies must be `application/json` or `*/*+json`
//! - `X-User` - The already authenticated caller, recorded on metadata
//! - `X-Content-Type-Name` - Names the type of a JSON response body
//! - `Content-Language` - The spreadsheet locale on cell responses
//! - `X-Request-Id` - Generated when absent and echoed on the response
//!
//! ## Error Handling
//!
//! | HTTP Status | Code | Description |
//! |-------------|------|-------------|
//! | 400 | invalid | Malformed id, selection, reference or body |
//! | 404 | not-found | Unknown spreadsheet, label or route |
//! | 405 | not-supported | Method not handled by a resource |
//! | 415 | not-supported | PATCH body that is not JSON |
//! | 500 | exception | Internal server error |
//!
//! ## Architecture
//!
//! - [`config`] - Server configuration
//! - [`error`] - Error types and their HTTP rendering
//! - [`state`] - Application state
//! - [`tenant`] - Per-spreadsheet contexts and their cache
//! - [`dispatch`] - Path dispatch, selections and resource mappings
//! - [`routing`] - Top-level routes and the per-spreadsheet route chain
//! - [`handlers`] - HTTP request handlers
//! - [`patch`] - Label resolution inside patch documents
//! - [`marshall`] - Type names and JSON encoding
//! - [`provider`] - Provider catalogs and locales
//! - [`middleware`] - Request checks
//! - [`responses`] - Response formatting and header generation

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod marshall;
pub mod middleware;
pub mod patch;
pub mod provider;
pub mod responses;
pub mod routing;
pub mod state;
pub mod tenant;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{RestError, RestResult};
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tabulon_persistence::engine::BasicEngine;
use tabulon_persistence::store::MemoryMetadataStore;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application with default configuration.
///
/// Metadata lives in memory and formulas are evaluated by [`BasicEngine`].
pub fn create_app() -> Router {
    create_app_with_config(ServerConfig::default())
}

/// Creates the Axum application with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use tabulon_rest::{create_app_with_config, ServerConfig};
///
/// let config = ServerConfig {
///     port: 3000,
///     auto_create_spreadsheets: true,
///     ..Default::default()
/// };
/// let app = create_app_with_config(config);
/// ```
pub fn create_app_with_config(config: ServerConfig) -> Router {
    let state = AppState::new(
        config,
        Arc::new(MemoryMetadataStore::new()),
        Arc::new(BasicEngine),
    );
    create_app_with_state(state)
}

/// Creates the Axum application around prepared state.
pub fn create_app_with_state(state: AppState) -> Router {
    let config = state.config().clone();
    info!(
        base_url = %config.base_url,
        static_dir = %config.static_dir.display(),
        auto_create = config.auto_create_spreadsheets,
        "Creating spreadsheet REST server"
    );

    let router = routing::create_routes(state).layer(DefaultBodyLimit::max(config.max_body_size));

    // Build middleware stack
    let service_builder = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    // Add CORS if enabled
    let router = if config.enable_cors {
        let cors = build_cors_layer(&config);
        router.layer(cors)
    } else {
        router
    };

    // Apply remaining middleware
    router.layer(service_builder)
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = config
            .cors_methods
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = config
            .cors_headers
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup. `RUST_LOG` takes
/// precedence over `level`.
///
/// # Arguments
///
/// * `level` - The log level (error, warn, info, debug, trace)
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "tabulon_rest={level},tabulon_persistence={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_lists_parse() {
        let config = ServerConfig {
            cors_origins: "http://a.example, http://b.example".to_string(),
            cors_methods: "GET, PATCH".to_string(),
            ..ServerConfig::default()
        };
        // Building must not panic on comma lists with spaces.
        let _ = build_cors_layer(&config);
    }
}
