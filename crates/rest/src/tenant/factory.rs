//! Construction of tenant contexts.

use std::sync::Arc;

use async_trait::async_trait;
use tabulon_persistence::engine::SpreadsheetEngine;
use tabulon_persistence::id::SpreadsheetId;
use tabulon_persistence::model::SpreadsheetMetadata;
use tabulon_persistence::store::{MetadataStore, StoreRepository};
use tracing::{debug, info};

use super::context::TenantContext;
use crate::error::{RestError, RestResult};
use crate::marshall::MarshallContext;
use crate::patch::LabelResolvingPreProcessor;
use crate::provider::ProviderFactory;

/// Builds the context for a spreadsheet the cache has not seen yet.
#[async_trait]
pub trait TenantContextFactory: Send + Sync {
    /// Creates the context for `id`.
    async fn create(&self, id: SpreadsheetId) -> RestResult<TenantContext>;
}

/// The factory used by the server.
///
/// Loads metadata from the [`MetadataStore`], optionally creating it, then
/// derives the providers and wires a fresh [`StoreRepository`] with a
/// label-resolving marshall context.
pub struct DefaultTenantContextFactory {
    metadata: Arc<dyn MetadataStore>,
    providers: Arc<ProviderFactory>,
    engine: Arc<dyn SpreadsheetEngine>,
    auto_create: bool,
    default_locale: String,
}

impl DefaultTenantContextFactory {
    /// Creates a factory.
    ///
    /// When `auto_create` is set, unknown ids get fresh metadata in
    /// `default_locale` instead of failing.
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        providers: Arc<ProviderFactory>,
        engine: Arc<dyn SpreadsheetEngine>,
        auto_create: bool,
        default_locale: impl Into<String>,
    ) -> Self {
        Self {
            metadata,
            providers,
            engine,
            auto_create,
            default_locale: default_locale.into(),
        }
    }

    async fn load_metadata(&self, id: SpreadsheetId) -> RestResult<SpreadsheetMetadata> {
        if let Some(metadata) = self.metadata.load(id).await? {
            return Ok(metadata);
        }
        if !self.auto_create {
            return Err(RestError::not_found(format!("Spreadsheet {} not found", id)));
        }

        info!(spreadsheet = %id, "Creating spreadsheet on first access");
        let metadata = SpreadsheetMetadata::new("Untitled", self.default_locale.clone()).with_id(id);
        Ok(self.metadata.save(metadata).await?)
    }
}

#[async_trait]
impl TenantContextFactory for DefaultTenantContextFactory {
    async fn create(&self, id: SpreadsheetId) -> RestResult<TenantContext> {
        let metadata = self.load_metadata(id).await?;
        let provider = self.providers.provider_for(&metadata)?;

        let repository = Arc::new(StoreRepository::new(Arc::clone(&self.metadata)));
        let marshall = MarshallContext::new().with_pre_processor(Arc::new(
            LabelResolvingPreProcessor::new(Arc::clone(&repository)),
        ));

        debug!(spreadsheet = %id, locale = %provider.locale.tag, "Built tenant context");
        Ok(TenantContext::new(
            id,
            metadata,
            repository,
            provider,
            Arc::clone(&self.engine),
            marshall,
        ))
    }
}
