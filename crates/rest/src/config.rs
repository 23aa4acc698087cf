//! Server configuration for the spreadsheet REST API.
//!
//! This module provides configuration types for the REST server, supporting
//! both programmatic configuration and environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TABULON_PORT` | 8080 | Server port |
//! | `TABULON_HOST` | 127.0.0.1 | Host to bind |
//! | `TABULON_LOG_LEVEL` | info | Log level |
//! | `TABULON_MAX_BODY_SIZE` | 10485760 | Max request body (bytes) |
//! | `TABULON_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `TABULON_ENABLE_CORS` | true | Enable CORS |
//! | `TABULON_CORS_ORIGINS` | * | Allowed origins |
//! | `TABULON_CORS_METHODS` | GET,POST,PATCH,DELETE,OPTIONS | Allowed methods |
//! | `TABULON_CORS_HEADERS` | Content-Type,Accept,X-User | Allowed headers |
//! | `TABULON_BASE_URL` | http://localhost:8080 | Server base URL |
//! | `TABULON_STATIC_DIR` | static | Directory served for unmatched paths |
//! | `TABULON_AUTO_CREATE` | false | Create spreadsheets on first access |
//! | `TABULON_DEFAULT_LOCALE` | en-AU | Locale of new spreadsheets |
//! | `TABULON_DEFAULT_PAGE_SIZE` | 20 | Default list page size |
//! | `TABULON_MAX_PAGE_SIZE` | 1000 | Largest list page size |
//!
//! # Example
//!
//! ```rust
//! use tabulon_rest::ServerConfig;
//!
//! // Create from environment
//! let config = ServerConfig::from_env();
//!
//! // Or create programmatically
//! let config = ServerConfig {
//!     port: 3000,
//!     host: "0.0.0.0".to_string(),
//!     auto_create_spreadsheets: true,
//!     ..Default::default()
//! };
//! ```

use std::path::PathBuf;

use clap::Parser;

/// Server configuration for the spreadsheet REST API.
///
/// This struct can be constructed from environment variables using [`ServerConfig::from_env`],
/// from command line arguments using [`ServerConfig::parse`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "tabulon")]
#[command(about = "Multi-spreadsheet REST server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "TABULON_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "TABULON_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "TABULON_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum request body size in bytes.
    #[arg(long, env = "TABULON_MAX_BODY_SIZE", default_value = "10485760")]
    pub max_body_size: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "TABULON_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "TABULON_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "TABULON_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(
        long,
        env = "TABULON_CORS_METHODS",
        default_value = "GET,POST,PATCH,DELETE,OPTIONS"
    )]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "TABULON_CORS_HEADERS",
        default_value = "Content-Type,Accept,X-User"
    )]
    pub cors_headers: String,

    /// Base URL for the server (used in Location headers).
    #[arg(long, env = "TABULON_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Directory of static files served for paths no API route claims.
    #[arg(long, env = "TABULON_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Create a spreadsheet with default metadata the first time an unknown
    /// id is addressed, instead of answering 404.
    #[arg(long = "auto-create", env = "TABULON_AUTO_CREATE", default_value = "false")]
    pub auto_create_spreadsheets: bool,

    /// Locale assigned to spreadsheets created without one.
    #[arg(long, env = "TABULON_DEFAULT_LOCALE", default_value = "en-AU")]
    pub default_locale: String,

    /// Default page size for spreadsheet listings.
    #[arg(long, env = "TABULON_DEFAULT_PAGE_SIZE", default_value = "20")]
    pub default_page_size: usize,

    /// Maximum page size for spreadsheet listings.
    #[arg(long, env = "TABULON_MAX_PAGE_SIZE", default_value = "1000")]
    pub max_page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            max_body_size: 10 * 1024 * 1024, // 10MB
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,PATCH,DELETE,OPTIONS".to_string(),
            cors_headers: "Content-Type,Accept,X-User".to_string(),
            base_url: "http://localhost:8080".to_string(),
            static_dir: PathBuf::from("static"),
            auto_create_spreadsheets: false,
            default_locale: "en-AU".to_string(),
            default_page_size: 20,
            max_page_size: 1000,
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// This is a convenience method that parses environment variables without
    /// requiring command line arguments.
    pub fn from_env() -> Self {
        // Try to parse from environment, falling back to defaults
        Self::try_parse_from(["tabulon"]).unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Clamps a requested page size to the configured bounds.
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.default_page_size == 0 {
            errors.push("Default page size cannot be 0".to_string());
        }

        if self.default_page_size > self.max_page_size {
            errors.push("Default page size cannot exceed max page size".to_string());
        }

        if self.default_locale.trim().is_empty() {
            errors.push("Default locale cannot be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// This uses ephemeral port 0, disables CORS and creates spreadsheets on
    /// first access so tests can address arbitrary ids.
    pub fn for_testing() -> Self {
        Self {
            port: 0, // Let OS assign port
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            max_body_size: 10 * 1024 * 1024,
            request_timeout: 5, // Shorter timeout for tests
            enable_cors: false,
            cors_origins: "*".to_string(),
            cors_methods: "*".to_string(),
            cors_headers: "*".to_string(),
            base_url: "http://localhost:0".to_string(),
            static_dir: PathBuf::from("static"),
            auto_create_spreadsheets: true,
            default_locale: "en-AU".to_string(),
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}
