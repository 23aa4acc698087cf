//! Integration tests for provider catalogs, health checks and static files.

mod common;

use common::assertions::{assert_error, assert_status, assert_type_name};
use common::harness::RestTestHarness;
use serde_json::Value;

#[tokio::test]
async fn test_feature_lists() {
    let harness = RestTestHarness::new();

    let cases = [
        ("/api/locale", "locale-list"),
        ("/api/date-time-symbols", "date-time-symbols-map"),
        ("/api/decimal-number-symbols", "decimal-number-symbols-map"),
        ("/api/function", "function-name-list"),
        ("/api/converter", "provider-info-list"),
        ("/api/form-handler", "provider-info-list"),
    ];
    for (path, type_name) in cases {
        let response = harness.get(path).await;
        assert_status(&response, 200);
        assert_type_name(&response, type_name);
    }
}

#[tokio::test]
async fn test_feature_lookup() {
    let harness = RestTestHarness::new();

    let locale = harness.get("/api/locale/EN-au").await;
    assert_status(&locale, 200);
    assert_eq!(locale.json::<Value>()["tag"], "en-AU");

    let symbols = harness.get("/api/decimal-number-symbols/de-DE").await;
    assert_status(&symbols, 200);
    assert_type_name(&symbols, "decimal-number-symbols");

    let function = harness.get("/api/function/sum").await;
    assert_eq!(function.json::<Value>(), "SUM");

    assert_error(&harness.get("/api/locale/xx-YY").await, 404, "not-found");
    assert_error(&harness.get("/api/plugin/nothing").await, 404, "not-found");
}

#[tokio::test]
async fn test_health_checks() {
    let harness = RestTestHarness::new();

    let health = harness.get("/health").await;
    assert_status(&health, 200);
    assert_eq!(health.json::<Value>()["status"], "healthy");

    assert_status(&harness.get("/_liveness").await, 200);

    let ready = harness.get("/_readiness").await;
    assert_status(&ready, 200);
    assert_eq!(ready.json::<Value>()["status"], "ready");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let harness = RestTestHarness::new();

    let response = harness.get("/health").await;
    assert!(response.maybe_header("x-request-id").is_some());
}

#[tokio::test]
async fn test_static_files() {
    let harness = RestTestHarness::new();

    let index = harness.get("/index.html").await;
    assert_status(&index, 200);
    assert!(index.text().contains("tabulon"));

    assert_status(&harness.get("/missing.js").await, 404);
}

#[tokio::test]
async fn test_empty_spreadsheet_id_is_not_routed() {
    let harness = RestTestHarness::new();

    assert_status(&harness.get("/api/spreadsheet//cell/A1").await, 404);
}
