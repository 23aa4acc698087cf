//! JSON marshalling with named types.
//!
//! Every JSON body the server produces is tagged with a stable type name,
//! sent in the `X-Content-Type-Name` header. Names come from the process-wide
//! [`TypeRegistry`], which is populated once on first use.
//!
//! Unmarshalling goes through a [`MarshallContext`], which can carry an
//! [`UnmarshallPreProcessor`] that rewrites the raw document before it is
//! decoded. Tenants use this to resolve labels in patch documents.

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tabulon_persistence::model::{SpreadsheetDelta, SpreadsheetMetadata};
use tabulon_persistence::reference::LabelMapping;

use crate::error::{RestError, RestResult};
use crate::provider::{DateTimeSymbols, DecimalNumberSymbols, LocaleInfo, ProviderInfo};

/// Maps Rust types to the names clients see.
pub struct TypeRegistry {
    names: RwLock<HashMap<TypeId, &'static str>>,
}

static GLOBAL: LazyLock<TypeRegistry> = LazyLock::new(|| {
    let registry = TypeRegistry::new();
    registry.register::<SpreadsheetDelta>("spreadsheet-delta");
    registry.register::<SpreadsheetMetadata>("spreadsheet-metadata");
    registry.register::<Vec<SpreadsheetMetadata>>("spreadsheet-metadata-list");
    registry.register::<LabelMapping>("spreadsheet-label-mapping");
    registry.register::<ProviderInfo>("provider-info");
    registry.register::<Vec<ProviderInfo>>("provider-info-list");
    registry.register::<LocaleInfo>("locale");
    registry.register::<Vec<LocaleInfo>>("locale-list");
    registry.register::<DecimalNumberSymbols>("decimal-number-symbols");
    registry.register::<DateTimeSymbols>("date-time-symbols");
    registry.register::<BTreeMap<String, DecimalNumberSymbols>>("decimal-number-symbols-map");
    registry.register::<BTreeMap<String, DateTimeSymbols>>("date-time-symbols-map");
    registry.register::<String>("function-name");
    registry.register::<Vec<String>>("function-name-list");
    registry
});

impl TypeRegistry {
    fn new() -> Self {
        Self {
            names: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the process-wide registry.
    pub fn global() -> &'static TypeRegistry {
        &GLOBAL
    }

    /// Registers `name` for `T`.
    ///
    /// Registering an already registered type keeps the first name.
    pub fn register<T: 'static>(&self, name: &'static str) -> &'static str {
        *self.names.write().entry(TypeId::of::<T>()).or_insert(name)
    }

    /// Returns the name registered for `T`.
    pub fn name_of<T: 'static>(&self) -> Option<&'static str> {
        self.names.read().get(&TypeId::of::<T>()).copied()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.names.read().len())
            .finish()
    }
}

fn type_name<T: 'static>() -> &'static str {
    TypeRegistry::global()
        .name_of::<T>()
        .unwrap_or_else(std::any::type_name::<T>)
}

/// Rewrites a raw JSON document before it is decoded.
pub trait UnmarshallPreProcessor: Send + Sync {
    /// Processes `value`, which is about to be decoded as `type_name`.
    fn process(&self, value: Value, type_name: &'static str) -> RestResult<Value>;
}

/// A JSON value tagged with its type name.
#[derive(Clone, Debug, PartialEq)]
pub struct Marshalled {
    /// The registered type name.
    pub type_name: &'static str,
    /// The JSON document.
    pub value: Value,
}

/// Encodes and decodes JSON bodies.
#[derive(Clone, Default)]
pub struct MarshallContext {
    pre_processor: Option<Arc<dyn UnmarshallPreProcessor>>,
}

impl MarshallContext {
    /// Creates a context without a pre-processor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this context using `pre_processor`.
    pub fn with_pre_processor(&self, pre_processor: Arc<dyn UnmarshallPreProcessor>) -> Self {
        Self {
            pre_processor: Some(pre_processor),
        }
    }

    /// Returns `true` if a pre-processor is installed.
    pub fn has_pre_processor(&self) -> bool {
        self.pre_processor.is_some()
    }

    /// Encodes `value` and tags it with its type name.
    pub fn marshall<T: Serialize + 'static>(&self, value: &T) -> RestResult<Marshalled> {
        let value = serde_json::to_value(value).map_err(|e| RestError::InternalError {
            message: format!("Failed to encode {}: {}", type_name::<T>(), e),
        })?;
        Ok(Marshalled {
            type_name: type_name::<T>(),
            value,
        })
    }

    /// Runs the pre-processor for a document that will become a `T`.
    pub fn pre_process<T: 'static>(&self, value: Value) -> RestResult<Value> {
        match &self.pre_processor {
            Some(pre_processor) => pre_processor.process(value, type_name::<T>()),
            None => Ok(value),
        }
    }

    /// Pre-processes and decodes `value`.
    pub fn unmarshall<T: DeserializeOwned + 'static>(&self, value: Value) -> RestResult<T> {
        let value = self.pre_process::<T>(value)?;
        Ok(serde_json::from_value(value)?)
    }
}

impl fmt::Debug for MarshallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarshallContext")
            .field("pre_processor", &self.pre_processor.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Upper;

    impl UnmarshallPreProcessor for Upper {
        fn process(&self, value: Value, type_name: &'static str) -> RestResult<Value> {
            if type_name != "spreadsheet-metadata" {
                return Ok(value);
            }
            let mut value = value;
            if let Some(name) = value.get("name").and_then(Value::as_str) {
                value["name"] = json!(name.to_uppercase());
            }
            Ok(value)
        }
    }

    #[test]
    fn test_registration_is_idempotent() {
        let registry = TypeRegistry::global();
        assert_eq!(
            registry.register::<SpreadsheetDelta>("something-else"),
            "spreadsheet-delta"
        );
        assert_eq!(
            registry.name_of::<SpreadsheetDelta>(),
            Some("spreadsheet-delta")
        );
    }

    #[test]
    fn test_marshall_tags_type() {
        let marshalled = MarshallContext::new()
            .marshall(&SpreadsheetDelta::new())
            .unwrap();
        assert_eq!(marshalled.type_name, "spreadsheet-delta");
        assert_eq!(marshalled.value, json!({}));
    }

    #[test]
    fn test_pre_processor_only_sees_its_type() {
        let context = MarshallContext::new().with_pre_processor(Arc::new(Upper));
        assert!(context.has_pre_processor());

        let metadata: SpreadsheetMetadata = context
            .unmarshall(json!({"name": "budget", "locale": "en-AU"}))
            .unwrap();
        assert_eq!(metadata.name, "BUDGET");

        let delta: SpreadsheetDelta = context.unmarshall(json!({"labels": []})).unwrap();
        assert!(delta.is_empty());
    }

    #[test]
    fn test_with_pre_processor_leaves_original_untouched() {
        let plain = MarshallContext::new();
        let _ = plain.with_pre_processor(Arc::new(Upper));
        assert!(!plain.has_pre_processor());
    }

    #[test]
    fn test_unmarshall_reports_bad_documents() {
        let result: RestResult<SpreadsheetDelta> =
            MarshallContext::new().unmarshall(json!({"cells": {"Total": {}}}));
        assert!(matches!(result, Err(RestError::BadRequest { .. })));
    }
}
