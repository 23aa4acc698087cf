//! Integration tests for cells, columns, rows and labels below a spreadsheet.

mod common;

use common::assertions::{assert_error, assert_status, assert_type_name};
use common::harness::{RestTestHarness, value_of};
use serde_json::{Value, json};

async fn spreadsheet(harness: &RestTestHarness) -> String {
    harness.create_spreadsheet("Resources").await
}

// =============================================================================
// Cells
// =============================================================================

#[tokio::test]
async fn test_formula_evaluates() {
    let harness = RestTestHarness::new();
    let id = spreadsheet(&harness).await;

    let saved = harness
        .post(
            &RestTestHarness::path(&id, "cell"),
            json!({ "cells": { "A1": { "formula": { "text": "=1+2" } } } }),
        )
        .await;
    assert_status(&saved, 201);
    assert_type_name(&saved, "spreadsheet-delta");
    assert_eq!(value_of(&saved.json(), "A1"), json!(3));

    let loaded = harness.get(&RestTestHarness::path(&id, "cell/a1")).await;
    assert_status(&loaded, 200);
    assert_eq!(value_of(&loaded.json(), "A1"), json!(3));
}

#[tokio::test]
async fn test_post_to_single_cell_then_force_recompute() {
    let harness = RestTestHarness::new();
    let id = spreadsheet(&harness).await;

    let saved = harness
        .post(
            &RestTestHarness::path(&id, "cell/B2"),
            json!({ "cells": { "B2": { "formula": { "text": "=1+2" } } } }),
        )
        .await;
    assert_status(&saved, 200);
    assert_type_name(&saved, "spreadsheet-delta");

    let forced = harness
        .get(&RestTestHarness::path(&id, "cell/B2/force-recompute"))
        .await;
    assert_status(&forced, 200);
    assert_eq!(value_of(&forced.json(), "B2"), json!(3));
}

#[tokio::test]
async fn test_evaluation_relations() {
    let harness = RestTestHarness::new();
    let id = spreadsheet(&harness).await;
    harness
        .post(
            &RestTestHarness::path(&id, "cell"),
            json!({ "cells": {
                "A1": { "formula": { "text": "5" } },
                "B1": { "formula": { "text": "=A1*2" } }
            } }),
        )
        .await;

    let skipped = harness
        .get(&RestTestHarness::path(
            &id,
            "cell/B1/clear-value-error-skip-evaluate",
        ))
        .await;
    assert_status(&skipped, 200);
    assert_eq!(value_of(&skipped.json(), "B1"), Value::Null);

    let forced = harness
        .get(&RestTestHarness::path(&id, "cell/B1/force-recompute"))
        .await;
    assert_eq!(value_of(&forced.json(), "B1"), json!(10));

    let unknown = harness
        .get(&RestTestHarness::path(&id, "cell/B1/sideways"))
        .await;
    assert_error(&unknown, 404, "not-found");
}

#[tokio::test]
async fn test_range_load_and_delete() {
    let harness = RestTestHarness::new();
    let id = spreadsheet(&harness).await;
    harness
        .post(
            &RestTestHarness::path(&id, "cell"),
            json!({ "cells": {
                "A1": { "formula": { "text": "1" } },
                "B2": { "formula": { "text": "2" } },
                "D4": { "formula": { "text": "4" } }
            } }),
        )
        .await;

    let range: Value = harness
        .get(&RestTestHarness::path(&id, "cell/A1:C3"))
        .await
        .json();
    let cells = range["cells"].as_object().unwrap();
    assert_eq!(cells.len(), 2);
    assert!(!cells.contains_key("D4"));

    let deleted = harness
        .delete(&RestTestHarness::path(&id, "cell/A1,B2"))
        .await;
    assert_status(&deleted, 200);
    assert_eq!(deleted.json::<Value>()["deletedCells"], json!(["A1", "B2"]));

    let rest: Value = harness
        .get(&RestTestHarness::path(&id, "cell/*"))
        .await
        .json();
    assert_eq!(rest["cells"].as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unsupported_method() {
    let harness = RestTestHarness::new();
    let id = spreadsheet(&harness).await;

    let response = harness
        .server
        .put(&RestTestHarness::path(&id, "cell/A1"))
        .json(&json!({}))
        .await;
    assert_error(&response, 405, "not-supported");
}

#[tokio::test]
async fn test_unknown_resource() {
    let harness = RestTestHarness::new();
    let id = spreadsheet(&harness).await;

    let response = harness
        .get(&RestTestHarness::path(&id, "chart/1"))
        .await;
    assert_error(&response, 404, "not-found");
}

#[tokio::test]
async fn test_invalid_selection() {
    let harness = RestTestHarness::new();
    let id = spreadsheet(&harness).await;

    let response = harness
        .get(&RestTestHarness::path(&id, "cell/1st"))
        .await;
    assert_error(&response, 400, "invalid");
}

// =============================================================================
// PATCH and labels in patch documents
// =============================================================================

#[tokio::test]
async fn test_patch_resolves_labels() {
    let harness = RestTestHarness::new();
    let id = spreadsheet(&harness).await;
    harness
        .post(
            &RestTestHarness::path(&id, "label"),
            json!({ "label": "Total", "reference": "C3" }),
        )
        .await;

    let patched = harness
        .patch(
            &RestTestHarness::path(&id, "cell"),
            json!({ "cells": { "Total": { "formula": { "text": "=40+2" } } } }),
        )
        .await;
    assert_status(&patched, 200);
    assert_eq!(value_of(&patched.json(), "C3"), json!(42));

    // Labels also work as selections.
    let loaded = harness
        .get(&RestTestHarness::path(&id, "cell/Total"))
        .await;
    assert_eq!(value_of(&loaded.json(), "C3"), json!(42));
}

#[tokio::test]
async fn test_patch_unknown_label_changes_nothing() {
    let harness = RestTestHarness::new();
    let id = spreadsheet(&harness).await;
    harness
        .post(
            &RestTestHarness::path(&id, "cell"),
            json!({ "cells": { "A1": { "formula": { "text": "1" } } } }),
        )
        .await;

    let response = harness
        .patch(
            &RestTestHarness::path(&id, "cell"),
            json!({ "cells": {
                "A1": { "formula": { "text": "2" } },
                "Missing": { "formula": { "text": "3" } }
            } }),
        )
        .await;
    assert_error(&response, 404, "not-found");

    let loaded = harness.get(&RestTestHarness::path(&id, "cell/A1")).await;
    assert_eq!(value_of(&loaded.json(), "A1"), json!(1));
}

#[tokio::test]
async fn test_patch_with_cyclic_labels_changes_nothing() {
    let harness = RestTestHarness::new();
    let id = spreadsheet(&harness).await;

    let response = harness
        .patch(
            &RestTestHarness::path(&id, "cell"),
            json!({
                "cells": { "A1": { "formula": { "text": "1" } } },
                "labels": [
                    { "label": "First", "reference": "Second" },
                    { "label": "Second", "reference": "First" }
                ]
            }),
        )
        .await;
    assert_error(&response, 400, "invalid");

    for label in ["First", "Second"] {
        let loaded = harness
            .get(&RestTestHarness::path(&id, &format!("label/{}", label)))
            .await;
        assert_error(&loaded, 404, "not-found");
    }
    let cell = harness.get(&RestTestHarness::path(&id, "cell/A1")).await;
    assert_status(&cell, 204);
}

#[tokio::test]
async fn test_patch_requires_json_content_type() {
    let harness = RestTestHarness::new();
    let id = spreadsheet(&harness).await;
    let path = RestTestHarness::path(&id, "cell");

    let response = harness
        .patch_raw(&path, "text/plain", r#"{"cells": {}}"#)
        .await;
    assert_error(&response, 415, "not-supported");

    let response = harness.server.patch(&path).await;
    assert_error(&response, 415, "not-supported");

    let response = harness
        .patch_raw(
            &path,
            "application/merge-patch+json",
            r#"{"cells": {"A1": {"formula": {"text": "9"}}}}"#,
        )
        .await;
    assert_status(&response, 200);
}

#[tokio::test]
async fn test_patch_malformed_json() {
    let harness = RestTestHarness::new();
    let id = spreadsheet(&harness).await;

    let response = harness
        .patch_raw(
            &RestTestHarness::path(&id, "cell"),
            "application/json",
            r#"{"cells": "#,
        )
        .await;
    assert_error(&response, 400, "invalid");
}

#[tokio::test]
async fn test_patch_null_deletes_cell() {
    let harness = RestTestHarness::new();
    let id = spreadsheet(&harness).await;
    let path = RestTestHarness::path(&id, "cell");
    harness
        .post(
            &path,
            json!({ "cells": { "A1": { "formula": { "text": "1" } } } }),
        )
        .await;

    let patched = harness.patch(&path, json!({ "cells": { "A1": null } })).await;
    assert_status(&patched, 200);
    assert_eq!(patched.json::<Value>()["deletedCells"], json!(["A1"]));

    let loaded = harness.get(&RestTestHarness::path(&id, "cell/A1")).await;
    assert_status(&loaded, 204);
}

// =============================================================================
// Columns and rows
// =============================================================================

#[tokio::test]
async fn test_columns() {
    let harness = RestTestHarness::new();
    let id = spreadsheet(&harness).await;

    let saved = harness
        .post(
            &RestTestHarness::path(&id, "column"),
            json!({
                "columns": { "B": { "hidden": true } },
                "columnWidths": { "A": 120.0, "C": 80.0 }
            }),
        )
        .await;
    assert_status(&saved, 201);

    let loaded: Value = harness
        .get(&RestTestHarness::path(&id, "column/A:B"))
        .await
        .json();
    assert_eq!(loaded["columns"]["B"]["hidden"], true);
    assert_eq!(loaded["columnWidths"], json!({ "A": 120.0 }));

    let rejected = harness
        .post(
            &RestTestHarness::path(&id, "column"),
            json!({ "columnWidths": { "D": -1.0 } }),
        )
        .await;
    assert_error(&rejected, 400, "invalid");

    let deleted = harness
        .delete(&RestTestHarness::path(&id, "column/B"))
        .await;
    assert_eq!(deleted.json::<Value>()["deletedColumns"], json!(["B"]));
}

#[tokio::test]
async fn test_rows() {
    let harness = RestTestHarness::new();
    let id = spreadsheet(&harness).await;

    harness
        .post(
            &RestTestHarness::path(&id, "row"),
            json!({ "rowHeights": { "1": 20.0, "2": 30.0, "5": 50.0 } }),
        )
        .await;

    let loaded: Value = harness
        .get(&RestTestHarness::path(&id, "row/1:3"))
        .await
        .json();
    assert_eq!(loaded["rowHeights"], json!({ "1": 20.0, "2": 30.0 }));

    let patched = harness
        .patch(
            &RestTestHarness::path(&id, "row/2"),
            json!({ "rowHeights": { "2": 35.0 } }),
        )
        .await;
    assert_status(&patched, 200);
    assert_eq!(patched.json::<Value>()["rowHeights"]["2"], 35.0);

    assert_error(
        &harness.get(&RestTestHarness::path(&id, "row/0")).await,
        400,
        "invalid",
    );
}

// =============================================================================
// Labels
// =============================================================================

#[tokio::test]
async fn test_labels() {
    let harness = RestTestHarness::new();
    let id = spreadsheet(&harness).await;

    let created = harness
        .post(
            &RestTestHarness::path(&id, "label"),
            json!({ "label": "Sales", "reference": "B2:B9" }),
        )
        .await;
    assert_status(&created, 201);
    assert_type_name(&created, "spreadsheet-label-mapping");

    let loaded = harness
        .get(&RestTestHarness::path(&id, "label/Sales"))
        .await;
    assert_status(&loaded, 200);
    assert_eq!(loaded.json::<Value>()["reference"], "B2:B9");

    let all: Value = harness
        .get(&RestTestHarness::path(&id, "label/*"))
        .await
        .json();
    assert_eq!(all["labels"].as_array().unwrap().len(), 1);

    let cycle = harness
        .post(
            &RestTestHarness::path(&id, "label"),
            json!({ "label": "Loop", "reference": "Loop" }),
        )
        .await;
    assert_error(&cycle, 400, "invalid");

    assert_status(
        &harness
            .delete(&RestTestHarness::path(&id, "label/Sales"))
            .await,
        204,
    );
    assert_error(
        &harness.get(&RestTestHarness::path(&id, "label/Sales")).await,
        404,
        "not-found",
    );
}

#[tokio::test]
async fn test_spreadsheets_are_isolated() {
    let harness = RestTestHarness::new();
    let first = harness.create_spreadsheet("First").await;
    let second = harness.create_spreadsheet("Second").await;

    harness
        .post(
            &RestTestHarness::path(&first, "cell"),
            json!({ "cells": { "A1": { "formula": { "text": "1" } } } }),
        )
        .await;

    let other = harness
        .get(&RestTestHarness::path(&second, "cell/A1"))
        .await;
    assert_status(&other, 204);
}
