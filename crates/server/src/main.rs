//! Tabulon
//!
//! Serves many spreadsheets over HTTP from one process.

use std::sync::Arc;

use clap::Parser;
use tabulon_persistence::engine::{BasicEngine, SpreadsheetEngine};
use tabulon_persistence::store::MemoryMetadataStore;
use tabulon_rest::{AppState, ServerConfig, create_app_with_state, init_logging};
use tracing::info;

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    let engine: Arc<dyn SpreadsheetEngine> = Arc::new(BasicEngine);
    info!(
        port = config.port,
        host = %config.host,
        default_locale = %config.default_locale,
        functions = engine.functions().len(),
        "Starting Tabulon"
    );

    let state = AppState::new(config.clone(), Arc::new(MemoryMetadataStore::new()), engine);
    let app = create_app_with_state(state);
    serve(app, &config).await
}
