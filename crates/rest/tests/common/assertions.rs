//! HTTP response assertions.

use axum_test::TestResponse;
use serde_json::Value;

/// Asserts that the response has the expected status code.
pub fn assert_status(response: &TestResponse, expected: u16) {
    let actual = response.status_code().as_u16();
    assert_eq!(
        actual,
        expected,
        "Expected status {}, got {}: {}",
        expected,
        actual,
        response.text()
    );
}

/// Asserts the `X-Content-Type-Name` header.
pub fn assert_type_name(response: &TestResponse, expected: &str) {
    let actual = response
        .maybe_header("x-content-type-name")
        .map(|v| v.to_str().unwrap_or_default().to_string());
    assert_eq!(actual.as_deref(), Some(expected), "Unexpected type name");
}

/// Asserts that the response is an error document with `code`.
pub fn assert_error(response: &TestResponse, status: u16, code: &str) {
    assert_status(response, status);
    let body: Value = response.json();
    assert_eq!(body["status"], status);
    assert_eq!(body["code"], code, "Unexpected error body {}", body);
}
