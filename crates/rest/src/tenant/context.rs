//! The per-spreadsheet execution context.

use std::sync::Arc;

use tabulon_persistence::engine::SpreadsheetEngine;
use tabulon_persistence::id::SpreadsheetId;
use tabulon_persistence::model::SpreadsheetMetadata;
use tabulon_persistence::store::StoreRepository;

use crate::marshall::MarshallContext;
use crate::provider::{LocaleInfo, SpreadsheetProvider};

/// Everything a request against one spreadsheet needs.
///
/// Contexts are immutable. A metadata change produces a new context through
/// [`TenantContext::with_metadata`] that shares the same stores.
#[derive(Clone, Debug)]
pub struct TenantContext {
    id: SpreadsheetId,
    metadata: SpreadsheetMetadata,
    repository: Arc<StoreRepository>,
    provider: SpreadsheetProvider,
    engine: Arc<dyn SpreadsheetEngine>,
    marshall: MarshallContext,
}

impl TenantContext {
    /// Assembles a context.
    pub fn new(
        id: SpreadsheetId,
        metadata: SpreadsheetMetadata,
        repository: Arc<StoreRepository>,
        provider: SpreadsheetProvider,
        engine: Arc<dyn SpreadsheetEngine>,
        marshall: MarshallContext,
    ) -> Self {
        Self {
            id,
            metadata,
            repository,
            provider,
            engine,
            marshall,
        }
    }

    /// The spreadsheet id.
    pub fn id(&self) -> SpreadsheetId {
        self.id
    }

    /// The metadata snapshot this context was built from.
    pub fn metadata(&self) -> &SpreadsheetMetadata {
        &self.metadata
    }

    /// The spreadsheet's stores.
    pub fn repository(&self) -> &Arc<StoreRepository> {
        &self.repository
    }

    /// Providers selected by the metadata.
    pub fn provider(&self) -> &SpreadsheetProvider {
        &self.provider
    }

    /// The formula engine.
    pub fn engine(&self) -> &dyn SpreadsheetEngine {
        self.engine.as_ref()
    }

    /// The marshall context, with label resolution installed.
    pub fn marshall(&self) -> &MarshallContext {
        &self.marshall
    }

    /// Returns a copy carrying new metadata and the providers it selects.
    pub fn with_metadata(
        &self,
        metadata: SpreadsheetMetadata,
        provider: SpreadsheetProvider,
    ) -> Self {
        Self {
            metadata,
            provider,
            ..self.clone()
        }
    }
}

/// Access to the caller's locale.
pub trait LocaleContext {
    /// The locale requests are interpreted in.
    fn locale(&self) -> &LocaleInfo;
}

/// Access to the already authenticated caller.
pub trait IdentityContext {
    /// The caller, when known.
    fn user(&self) -> Option<&str>;
}

/// Access to a marshall context.
pub trait MarshallContextProvider {
    /// The marshall context bodies are encoded and decoded with.
    fn marshall_context(&self) -> &MarshallContext;
}

impl LocaleContext for TenantContext {
    fn locale(&self) -> &LocaleInfo {
        &self.provider.locale
    }
}

impl MarshallContextProvider for TenantContext {
    fn marshall_context(&self) -> &MarshallContext {
        &self.marshall
    }
}
