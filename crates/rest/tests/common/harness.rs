//! REST API test harness.
//!
//! Runs the full application, middleware included, against an in-memory
//! metadata store and a temporary static directory.

use axum::http::{HeaderName, HeaderValue, header};
use axum_test::{TestResponse, TestServer};
use serde_json::{Value, json};
use tempfile::TempDir;

use tabulon_rest::{ServerConfig, create_app_with_config};

/// Test harness for REST API testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_formula() {
///     let harness = RestTestHarness::new();
///     let id = harness.create_spreadsheet("Budget").await;
///
///     let response = harness.get(&format!("/api/spreadsheet/{}/cell/A1", id)).await;
///     assert_eq!(response.status_code(), 204);
/// }
/// ```
pub struct RestTestHarness {
    /// The test server instance.
    pub server: TestServer,

    /// Server configuration.
    pub config: ServerConfig,

    static_dir: TempDir,
}

impl RestTestHarness {
    /// Creates a harness with the testing configuration.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Creates a harness after letting `customize` adjust the configuration.
    pub fn with_config(customize: impl FnOnce(&mut ServerConfig)) -> Self {
        let static_dir = TempDir::new().expect("Failed to create static dir");
        std::fs::write(
            static_dir.path().join("index.html"),
            "<html><body>tabulon</body></html>",
        )
        .expect("Failed to write index.html");

        let mut config = ServerConfig {
            static_dir: static_dir.path().to_path_buf(),
            ..ServerConfig::for_testing()
        };
        customize(&mut config);

        let app = create_app_with_config(config.clone());
        let server = TestServer::new(app).expect("Failed to create test server");

        Self {
            server,
            config,
            static_dir,
        }
    }

    /// Creates a spreadsheet and returns its id.
    pub async fn create_spreadsheet(&self, name: &str) -> String {
        let response = self.post("/api/spreadsheet", json!({ "name": name })).await;
        assert_eq!(response.status_code(), 201, "create failed: {}", response.text());
        response.json::<Value>()["id"]
            .as_str()
            .expect("created metadata carries an id")
            .to_string()
    }

    /// Path of a resource below spreadsheet `id`.
    pub fn path(id: &str, rest: &str) -> String {
        format!("/api/spreadsheet/{}/{}", id, rest)
    }

    /// Makes a GET request.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.server.get(path).await
    }

    /// Makes a POST request with a JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.server.post(path).json(&body).await
    }

    /// Makes a PATCH request with a JSON body.
    pub async fn patch(&self, path: &str, body: Value) -> TestResponse {
        self.server.patch(path).json(&body).await
    }

    /// Makes a PATCH request with a raw body and content type.
    pub async fn patch_raw(&self, path: &str, content_type: &'static str, body: &str) -> TestResponse {
        self.server
            .patch(path)
            .add_header(header::CONTENT_TYPE, HeaderValue::from_static(content_type))
            .bytes(body.to_string().into())
            .await
    }

    /// Makes a PATCH request as `user`.
    pub async fn patch_as(&self, user: &'static str, path: &str, body: Value) -> TestResponse {
        self.server
            .patch(path)
            .add_header(X_USER, HeaderValue::from_static(user))
            .json(&body)
            .await
    }

    /// Makes a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.server.delete(path).await
    }
}

impl Default for RestTestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// The caller header.
pub const X_USER: HeaderName = HeaderName::from_static("x-user");

/// Reads `cells.<cell>.formula.value` out of a delta.
pub fn value_of(delta: &Value, cell: &str) -> Value {
    delta["cells"][cell]["formula"]["value"].clone()
}
