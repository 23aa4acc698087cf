//! Label resolution for delta patch documents.
//!
//! Clients may key the `cells` object of a delta by label instead of by cell
//! reference:
//!
//! ```json
//! {"cells": {"Total": {"formula": {"text": "=SUM(A1:A9)"}}}}
//! ```
//!
//! Before such a document is merged into stored state every label key is
//! replaced by the cell it resolves to. Nothing else in the document is
//! touched.

use std::sync::Arc;

use serde_json::{Map, Value};
use tabulon_persistence::reference::{CellReference, LabelName};
use tabulon_persistence::store::{LabelStore, StoreRepository};

use crate::error::RestResult;
use crate::marshall::UnmarshallPreProcessor;

/// The type name whose documents are rewritten.
const DELTA_TYPE: &str = "spreadsheet-delta";

/// Rewrites label keys of a delta's `cells` object to cell references.
///
/// Keys already naming a cell are kept verbatim. When a label and a cell key
/// land on the same cell, the entry appearing last in the document wins.
/// Resolving an already resolved document returns it unchanged.
pub fn resolve_labels(document: Value, labels: &LabelStore) -> RestResult<Value> {
    let Value::Object(mut root) = document else {
        return Ok(document);
    };

    if let Some(Value::Object(cells)) = root.get_mut("cells") {
        let mut resolved = Map::with_capacity(cells.len());
        for (key, cell) in std::mem::take(cells) {
            let key = if CellReference::try_parse(&key).is_some() {
                key
            } else {
                let label = LabelName::parse(&key)?;
                labels.resolve_cell(&label)?.to_string()
            };
            // Re-inserting moves the key to the end so document order decides.
            resolved.shift_remove(&key);
            resolved.insert(key, cell);
        }
        *cells = resolved;
    }

    Ok(Value::Object(root))
}

/// Installs [`resolve_labels`] on a tenant's marshall context.
#[derive(Debug)]
pub struct LabelResolvingPreProcessor {
    repository: Arc<StoreRepository>,
}

impl LabelResolvingPreProcessor {
    /// Creates a pre-processor resolving against `repository`'s labels.
    pub fn new(repository: Arc<StoreRepository>) -> Self {
        Self { repository }
    }
}

impl UnmarshallPreProcessor for LabelResolvingPreProcessor {
    fn process(&self, value: Value, type_name: &'static str) -> RestResult<Value> {
        if type_name != DELTA_TYPE {
            return Ok(value);
        }
        resolve_labels(value, &self.repository.labels).map_err(|e| {
            tracing::debug!(error = %e, "Label resolution failed");
            e
        })
    }
}
