//! The tenant context cache.
//!
//! Contexts are built lazily on first access and then shared. Each id owns a
//! [`OnceCell`] so concurrent first requests for the same spreadsheet wait for
//! a single construction, while requests for other spreadsheets proceed.
//! A failed construction leaves its cell empty; the next request retries.
//!
//! Metadata changes go through [`TenantCache::update_lock`] so that saving
//! new metadata and publishing the matching context happen in one order.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tabulon_persistence::id::SpreadsheetId;
use tokio::sync::{Mutex as AsyncMutex, OnceCell, OwnedMutexGuard};
use tracing::debug;

use super::context::TenantContext;
use super::factory::TenantContextFactory;
use crate::error::RestResult;

type Slot = Arc<OnceCell<Arc<TenantContext>>>;

/// Caches one [`TenantContext`] per spreadsheet.
pub struct TenantCache {
    factory: Arc<dyn TenantContextFactory>,
    entries: Mutex<HashMap<SpreadsheetId, Slot>>,
    updates: Mutex<HashMap<SpreadsheetId, Arc<AsyncMutex<()>>>>,
}

impl TenantCache {
    /// Creates an empty cache building contexts with `factory`.
    pub fn new(factory: Arc<dyn TenantContextFactory>) -> Self {
        Self {
            factory,
            entries: Mutex::new(HashMap::new()),
            updates: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, id: SpreadsheetId) -> Slot {
        Arc::clone(self.entries.lock().entry(id).or_default())
    }

    /// Returns the context for `id`, building it on first access.
    ///
    /// Every caller receives the same `Arc` until the entry is evicted or
    /// replaced.
    pub async fn resolve(&self, id: SpreadsheetId) -> RestResult<Arc<TenantContext>> {
        let slot = self.slot(id);
        let result = slot
            .get_or_try_init(|| async {
                debug!(spreadsheet = %id, "Tenant cache miss");
                self.factory.create(id).await.map(Arc::new)
            })
            .await
            .cloned();

        if result.is_err() {
            let mut entries = self.entries.lock();
            if entries
                .get(&id)
                .is_some_and(|current| Arc::ptr_eq(current, &slot) && !current.initialized())
            {
                entries.remove(&id);
            }
        }
        result
    }

    /// Returns the cached context for `id` without building one.
    pub fn get(&self, id: SpreadsheetId) -> Option<Arc<TenantContext>> {
        self.entries.lock().get(&id).and_then(|slot| slot.get().cloned())
    }

    /// Publishes `context` as the context for its spreadsheet.
    pub fn replace(&self, context: TenantContext) -> Arc<TenantContext> {
        publish(&mut self.entries.lock(), context)
    }

    /// Replaces the cached context for `id` with `change` applied to it.
    ///
    /// A context still being built was built from what is now stale, so its
    /// slot is dropped and the next request builds afresh. Returns the
    /// published context, if any.
    pub fn update(
        &self,
        id: SpreadsheetId,
        change: impl FnOnce(&TenantContext) -> TenantContext,
    ) -> Option<Arc<TenantContext>> {
        let mut entries = self.entries.lock();
        let current = entries.get(&id).map(|slot| slot.get().cloned())?;
        match current {
            Some(context) => Some(publish(&mut entries, change(&context))),
            None => {
                entries.remove(&id);
                debug!(spreadsheet = %id, "Dropped tenant context under construction");
                None
            }
        }
    }

    /// Serializes metadata changes to `id`. Hold the guard from loading the
    /// metadata until the changed context is published.
    pub async fn update_lock(&self, id: SpreadsheetId) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(self.updates.lock().entry(id).or_default());
        lock.lock_owned().await
    }

    /// Drops the context for `id`, returning `true` if one was cached.
    pub fn evict(&self, id: SpreadsheetId) -> bool {
        self.updates.lock().remove(&id);
        let removed = self
            .entries
            .lock()
            .remove(&id)
            .is_some_and(|slot| slot.initialized());
        if removed {
            debug!(spreadsheet = %id, "Evicted tenant context");
        }
        removed
    }

    /// Returns `true` if a built context is cached for `id`.
    pub fn contains(&self, id: SpreadsheetId) -> bool {
        self.get(id).is_some()
    }

    /// Returns the number of built contexts.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    /// Returns `true` if no context is built.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn publish(entries: &mut HashMap<SpreadsheetId, Slot>, context: TenantContext) -> Arc<TenantContext> {
    let context = Arc::new(context);
    let slot = Arc::new(OnceCell::new_with(Some(Arc::clone(&context))));
    entries.insert(context.id(), slot);
    debug!(spreadsheet = %context.id(), "Replaced tenant context");
    context
}

impl std::fmt::Debug for TenantCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantCache")
            .field("entries", &self.len())
            .finish()
    }
}
