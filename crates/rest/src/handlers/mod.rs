//! HTTP request handlers.
//!
//! Tenant resources are served through [`ResourceMapping`](crate::dispatch::ResourceMapping)s:
//!
//! - [`cell`] - Cells and their evaluation relations
//! - [`column`] - Column records and widths
//! - [`row`] - Row records and heights
//! - [`label`] - Label mappings
//!
//! Everything else is a plain axum handler:
//!
//! - [`metadata`] - Spreadsheet create, list, load, patch and delete
//! - [`features`] - Provider catalog lookups under `/api/<feature>`
//! - [`engine`] - Hands `/api/spreadsheet/<id>/...` to the path dispatcher
//! - [`health`] - Health check endpoints

pub mod cell;
pub mod column;
pub mod engine;
pub mod features;
pub mod health;
pub mod label;
pub mod metadata;
pub mod row;

pub use engine::engine_handler;
pub use health::{health_handler, liveness_handler, readiness_handler};
pub use metadata::{
    create_handler, delete_handler, list_handler, load_handler, patch_handler,
};

use std::fmt::Display;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tabulon_persistence::error::ReferenceError;
use tabulon_persistence::model::SpreadsheetDelta;

use crate::dispatch::{HandlerContext, RequestBody};
use crate::error::{RestError, RestResult};
use crate::marshall::Marshalled;
use crate::tenant::MarshallContextProvider;

/// Applies a JSON merge patch to `current`.
pub(crate) fn merge_patch<T>(current: &T, patch: &Value) -> RestResult<T>
where
    T: Serialize + DeserializeOwned,
{
    let mut document = serde_json::to_value(current).map_err(|e| RestError::InternalError {
        message: format!("Failed to encode patch target: {}", e),
    })?;
    json_patch::merge(&mut document, patch);
    Ok(serde_json::from_value(document)?)
}

/// Rewrites the keys of the `field` object in `patch` to their canonical
/// spelling, returning the parsed ids in document order.
///
/// `b2` and `B2` name the same cell; merging a patch keyed `b2` into a
/// document keyed `B2` would otherwise leave both.
pub(crate) fn canonicalize_keys<T: Display>(
    patch: &mut Value,
    field: &str,
    parse: fn(&str) -> Result<T, ReferenceError>,
) -> RestResult<Vec<T>> {
    let Some(entries) = patch.get_mut(field).and_then(Value::as_object_mut) else {
        return Ok(Vec::new());
    };

    let mut ids = Vec::with_capacity(entries.len());
    let mut canonical = Map::with_capacity(entries.len());
    for (key, value) in std::mem::take(entries) {
        let id = parse(&key)?;
        canonical.insert(id.to_string(), value);
        ids.push(id);
    }
    *entries = canonical;
    Ok(ids)
}

/// Marshalls `delta`, answering no content when it is empty.
pub(crate) fn respond(
    context: &HandlerContext,
    delta: SpreadsheetDelta,
) -> RestResult<Option<Marshalled>> {
    if delta.is_empty() {
        return Ok(None);
    }
    context.marshall_context().marshall(&delta).map(Some)
}

/// Fails with 400 when a handler that needs a body got none.
pub(crate) fn required<B>(body: Option<RequestBody<B>>) -> RestResult<RequestBody<B>> {
    body.ok_or_else(|| RestError::bad_request("Missing request body"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::test_support::handler_context;
    use serde_json::json;
    use tabulon_persistence::model::SpreadsheetMetadata;

    #[test]
    fn test_merge_patch_replaces_and_removes() {
        let metadata = SpreadsheetMetadata::new("Budget", "en-AU");
        let patched: SpreadsheetMetadata =
            merge_patch(&metadata, &json!({"name": "Forecast", "locale": "en-GB"})).unwrap();
        assert_eq!(patched.name, "Forecast");
        assert_eq!(patched.locale, "en-GB");
    }

    #[test]
    fn test_merge_patch_rejects_bad_shape() {
        let result: RestResult<SpreadsheetDelta> =
            merge_patch(&SpreadsheetDelta::new(), &json!({"cells": {"nope!": {}}}));
        assert_eq!(result.unwrap_err().status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_canonicalize_keys() {
        use tabulon_persistence::reference::CellReference;

        let mut patch = json!({"cells": {"b2": {"formula": {"text": "1"}}, "$C$3": null}, "x": 1});
        let ids = canonicalize_keys(&mut patch, "cells", CellReference::parse).unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(patch, json!({"cells": {"B2": {"formula": {"text": "1"}}, "C3": null}, "x": 1}));

        assert!(canonicalize_keys(&mut patch, "rows", CellReference::parse).unwrap().is_empty());
        let mut bad = json!({"cells": {"Total": {}}});
        assert!(canonicalize_keys(&mut bad, "cells", CellReference::parse).is_err());
    }

    #[test]
    fn test_empty_delta_has_no_content() {
        let context = handler_context();
        assert!(respond(&context, SpreadsheetDelta::new()).unwrap().is_none());
    }

    #[test]
    fn test_missing_body() {
        let body: Option<RequestBody<SpreadsheetDelta>> = None;
        assert_eq!(
            required(body).unwrap_err().to_string(),
            "Bad request: Missing request body"
        );
    }
}
