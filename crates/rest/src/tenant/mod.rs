//! Per-spreadsheet tenant contexts.
//!
//! Each spreadsheet is a tenant with its own stores, providers and marshall
//! context. This module provides:
//!
//! - [`TenantContext`] - the immutable bundle handed to handlers
//! - [`TenantContextFactory`] - how a context is built on first access
//! - [`TenantCache`] - the lazily populated, per-id cache of contexts
//!
//! # Example
//!
//! ```rust,ignore
//! let cache = TenantCache::new(Arc::new(factory));
//! let context = cache.resolve(SpreadsheetId::new(0x1f)).await?;
//! println!("{}", context.metadata().name);
//! ```

mod cache;
mod context;
mod factory;

pub use cache::TenantCache;
pub use context::{IdentityContext, LocaleContext, MarshallContextProvider, TenantContext};
pub use factory::{DefaultTenantContextFactory, TenantContextFactory};
