//! Application state shared by every handler.

use std::fmt;
use std::sync::Arc;

use tabulon_persistence::engine::SpreadsheetEngine;
use tabulon_persistence::store::MetadataStore;

use crate::config::ServerConfig;
use crate::dispatch::PathDispatcher;
use crate::marshall::MarshallContext;
use crate::provider::ProviderFactory;
use crate::routing::tenant_routes;
use crate::tenant::{DefaultTenantContextFactory, TenantCache, TenantContextFactory};

/// Index of the spreadsheet id in `/api/spreadsheet/<id>/...`.
pub const SPREADSHEET_ID_COMPONENT: usize = 2;

/// Shared application state for the REST API.
///
/// Cloning is cheap; every field is shared.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use tabulon_persistence::{BasicEngine, MemoryMetadataStore};
/// use tabulon_rest::{AppState, ServerConfig};
///
/// let state = AppState::new(
///     ServerConfig::default(),
///     Arc::new(MemoryMetadataStore::new()),
///     Arc::new(BasicEngine),
/// );
/// ```
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    metadata: Arc<dyn MetadataStore>,
    providers: Arc<ProviderFactory>,
    tenants: Arc<TenantCache>,
    dispatcher: Arc<PathDispatcher>,
    marshall: MarshallContext,
}

impl AppState {
    /// Creates the state with the built-in providers and tenant factory.
    pub fn new(
        config: ServerConfig,
        metadata: Arc<dyn MetadataStore>,
        engine: Arc<dyn SpreadsheetEngine>,
    ) -> Self {
        let providers = Arc::new(ProviderFactory::builtin(engine.functions()));
        let factory = DefaultTenantContextFactory::new(
            Arc::clone(&metadata),
            Arc::clone(&providers),
            engine,
            config.auto_create_spreadsheets,
            config.default_locale.clone(),
        );
        Self::from_parts(config, metadata, providers, Arc::new(factory))
    }

    /// Creates the state around a custom tenant factory.
    pub fn from_parts(
        config: ServerConfig,
        metadata: Arc<dyn MetadataStore>,
        providers: Arc<ProviderFactory>,
        factory: Arc<dyn TenantContextFactory>,
    ) -> Self {
        let tenants = Arc::new(TenantCache::new(factory));
        let dispatcher = Arc::new(PathDispatcher::new(
            SPREADSHEET_ID_COMPONENT,
            Arc::clone(&tenants),
            tenant_routes,
        ));
        Self {
            config: Arc::new(config),
            metadata,
            providers,
            tenants,
            dispatcher,
            marshall: MarshallContext::new(),
        }
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the metadata store.
    pub fn metadata(&self) -> &dyn MetadataStore {
        self.metadata.as_ref()
    }

    /// Returns the provider factory.
    pub fn providers(&self) -> &ProviderFactory {
        &self.providers
    }

    /// Returns the tenant context cache.
    pub fn tenants(&self) -> &TenantCache {
        &self.tenants
    }

    /// Returns the dispatcher serving `/api/spreadsheet/<id>/...`.
    pub fn dispatcher(&self) -> &PathDispatcher {
        &self.dispatcher
    }

    /// Returns the marshall context for requests outside any spreadsheet.
    pub fn marshall(&self) -> &MarshallContext {
        &self.marshall
    }

    /// Returns the base URL for the server.
    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("base_url", &self.config.base_url)
            .field("tenants", &self.tenants)
            .finish_non_exhaustive()
    }
}
