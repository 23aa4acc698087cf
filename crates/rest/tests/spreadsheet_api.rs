//! Integration tests for spreadsheet metadata and the tenant cache behind it.

mod common;

use common::assertions::{assert_error, assert_status, assert_type_name};
use common::harness::{RestTestHarness, value_of};
use serde_json::{Value, json};

// =============================================================================
// Metadata CRUD
// =============================================================================

#[tokio::test]
async fn test_create_assigns_id_and_location() {
    let harness = RestTestHarness::new();

    let response = harness
        .post("/api/spreadsheet", json!({ "name": "Budget", "id": "ffff" }))
        .await;
    assert_status(&response, 201);
    assert_type_name(&response, "spreadsheet-metadata");

    let body: Value = response.json();
    let id = body["id"].as_str().unwrap();
    assert_ne!(id, "ffff", "client supplied ids are ignored");
    assert_eq!(body["name"], "Budget");
    assert_eq!(body["locale"], "en-AU");

    let location = response.header("location");
    assert_eq!(
        location.to_str().unwrap(),
        format!("http://localhost:0/api/spreadsheet/{}", id)
    );
}

#[tokio::test]
async fn test_create_with_empty_body() {
    let harness = RestTestHarness::new();

    let response = harness.server.post("/api/spreadsheet").await;
    assert_status(&response, 201);
    assert_eq!(response.json::<Value>()["locale"], "en-AU");
}

#[tokio::test]
async fn test_create_rejects_unknown_locale() {
    let harness = RestTestHarness::new();

    let response = harness
        .post("/api/spreadsheet", json!({ "name": "Budget", "locale": "xx-YY" }))
        .await;
    assert_error(&response, 400, "invalid");
}

#[tokio::test]
async fn test_load_patch_delete() {
    let harness = RestTestHarness::new();
    let id = harness.create_spreadsheet("Budget").await;
    let path = format!("/api/spreadsheet/{}", id);

    let loaded = harness.get(&path).await;
    assert_status(&loaded, 200);
    assert_eq!(loaded.json::<Value>()["name"], "Budget");

    let patched = harness
        .patch_as("alice", &path, json!({ "name": "Budget 2025", "id": "1234" }))
        .await;
    assert_status(&patched, 200);
    let body: Value = patched.json();
    assert_eq!(body["name"], "Budget 2025");
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["modifiedBy"], "alice");

    assert_status(&harness.delete(&path).await, 204);
    assert_error(&harness.get(&path).await, 404, "not-found");
    assert_error(&harness.delete(&path).await, 404, "not-found");
}

#[tokio::test]
async fn test_patch_requires_json() {
    let harness = RestTestHarness::new();
    let id = harness.create_spreadsheet("Budget").await;

    let response = harness
        .patch_raw(&format!("/api/spreadsheet/{}", id), "text/plain", "name=x")
        .await;
    assert_error(&response, 415, "not-supported");
}

#[tokio::test]
async fn test_invalid_id() {
    let harness = RestTestHarness::new();

    for path in ["/api/spreadsheet/xyz", "/api/spreadsheet/-1", "/api/spreadsheet/0x10"] {
        assert_error(&harness.get(path).await, 400, "invalid");
    }
    assert_error(
        &harness.get("/api/spreadsheet/nothex/cell/A1").await,
        400,
        "invalid",
    );
}

#[tokio::test]
async fn test_list_and_find_by_name() {
    let harness = RestTestHarness::new();
    for name in ["Budget 2024", "Budget 2025", "Roster"] {
        harness.create_spreadsheet(name).await;
    }

    let all: Value = harness.get("/api/spreadsheet").await.json();
    assert_eq!(all.as_array().unwrap().len(), 3);

    let found = harness.get("/api/spreadsheet?name=budget").await;
    assert_status(&found, 200);
    assert_type_name(&found, "spreadsheet-metadata-list");
    assert_eq!(found.json::<Value>().as_array().unwrap().len(), 2);

    let paged: Value = harness
        .get("/api/spreadsheet?offset=1&count=1")
        .await
        .json();
    assert_eq!(paged.as_array().unwrap().len(), 1);
}

// =============================================================================
// Tenant cache
// =============================================================================

#[tokio::test]
async fn test_unknown_spreadsheet_without_auto_create() {
    let harness = RestTestHarness::with_config(|c| c.auto_create_spreadsheets = false);

    let response = harness.get("/api/spreadsheet/abc/cell/A1").await;
    assert_error(&response, 404, "not-found");

    // A failed build is not cached; once the spreadsheet exists it works.
    let id = harness.create_spreadsheet("Later").await;
    let response = harness.get(&RestTestHarness::path(&id, "cell/A1")).await;
    assert_status(&response, 204);
}

#[tokio::test]
async fn test_auto_create_on_first_access() {
    let harness = RestTestHarness::new();

    let response = harness.get("/api/spreadsheet/abc/cell/A1").await;
    assert_status(&response, 204);

    let metadata = harness.get("/api/spreadsheet/abc").await;
    assert_status(&metadata, 200);
    assert_eq!(metadata.json::<Value>()["id"], "abc");
}

#[tokio::test]
async fn test_concurrent_first_access_builds_one_context() {
    let harness = RestTestHarness::new();
    let id = harness.create_spreadsheet("Shared").await;
    let a1 = RestTestHarness::path(&id, "cell/A1");
    let b1 = RestTestHarness::path(&id, "cell/B1");
    let cell = RestTestHarness::path(&id, "cell");

    let (first, second) = tokio::join!(
        harness.post(&cell, json!({ "cells": { "A1": { "formula": { "text": "1" } } } })),
        harness.post(&cell, json!({ "cells": { "B1": { "formula": { "text": "2" } } } })),
    );
    assert_status(&first, 201);
    assert_status(&second, 201);

    // Both writes landed in the same stores.
    assert_eq!(value_of(&harness.get(&a1).await.json(), "A1"), json!(1));
    assert_eq!(value_of(&harness.get(&b1).await.json(), "B1"), json!(2));

    let health: Value = harness.get("/health").await.json();
    assert_eq!(health["spreadsheets"], 1);
}

#[tokio::test]
async fn test_delete_evicts_context() {
    let harness = RestTestHarness::new();
    let id = harness.create_spreadsheet("Doomed").await;
    let cell = RestTestHarness::path(&id, "cell");

    harness
        .post(&cell, json!({ "cells": { "A1": { "formula": { "text": "7" } } } }))
        .await;
    assert_eq!(harness.get("/health").await.json::<Value>()["spreadsheets"], 1);

    assert_status(&harness.delete(&format!("/api/spreadsheet/{}", id)).await, 204);
    assert_eq!(harness.get("/health").await.json::<Value>()["spreadsheets"], 0);

    // Auto-create brings back an empty spreadsheet under the same id.
    let response = harness.get(&RestTestHarness::path(&id, "cell/A1")).await;
    assert_status(&response, 204);
}

#[tokio::test]
async fn test_metadata_patch_replaces_context() {
    let harness = RestTestHarness::new();
    let id = harness.create_spreadsheet("Localized").await;
    let cell = RestTestHarness::path(&id, "cell");

    let saved = harness
        .post(&cell, json!({ "cells": { "A1": { "formula": { "text": "=1+1" } } } }))
        .await;
    assert_eq!(saved.header("content-language"), "en-AU");

    let patched = harness
        .patch(&format!("/api/spreadsheet/{}", id), json!({ "locale": "fr-FR" }))
        .await;
    assert_status(&patched, 200);

    let loaded = harness.get(&RestTestHarness::path(&id, "cell/A1")).await;
    assert_status(&loaded, 200);
    assert_eq!(loaded.header("content-language"), "fr-FR");
    assert_eq!(value_of(&loaded.json(), "A1"), json!(2), "cells survive the swap");
}

#[tokio::test]
async fn test_racing_metadata_patches_agree_with_context() {
    let harness = RestTestHarness::new();
    let id = harness.create_spreadsheet("Contested").await;
    let path = format!("/api/spreadsheet/{}", id);
    let a1 = RestTestHarness::path(&id, "cell/A1");

    harness
        .post(
            &RestTestHarness::path(&id, "cell"),
            json!({ "cells": { "A1": { "formula": { "text": "1" } } } }),
        )
        .await;

    for _ in 0..5 {
        let (first, second) = tokio::join!(
            harness.patch(&path, json!({ "locale": "fr-FR" })),
            harness.patch(&path, json!({ "locale": "de-DE" })),
        );
        assert_status(&first, 200);
        assert_status(&second, 200);

        let stored: Value = harness.get(&path).await.json();
        let loaded = harness.get(&a1).await;
        assert_eq!(
            loaded.header("content-language").to_str().unwrap(),
            stored["locale"].as_str().unwrap()
        );
    }
}

#[tokio::test]
async fn test_metadata_patch_rejects_unknown_locale() {
    let harness = RestTestHarness::new();
    let id = harness.create_spreadsheet("Localized").await;
    let path = format!("/api/spreadsheet/{}", id);

    let response = harness.patch(&path, json!({ "locale": "xx-YY" })).await;
    assert_error(&response, 400, "invalid");
    assert_eq!(harness.get(&path).await.json::<Value>()["locale"], "en-AU");
}
