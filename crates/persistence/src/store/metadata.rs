//! Spreadsheet metadata storage.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::id::SpreadsheetId;
use crate::model::SpreadsheetMetadata;

/// Storage for the metadata of every spreadsheet.
///
/// This is the one store shared across tenants; everything else lives in a
/// per-spreadsheet [`StoreRepository`](super::StoreRepository).
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Loads metadata by id, returning `None` if absent.
    async fn load(&self, id: SpreadsheetId) -> StoreResult<Option<SpreadsheetMetadata>>;

    /// Stores new metadata under a freshly assigned id.
    async fn create(&self, metadata: SpreadsheetMetadata) -> StoreResult<SpreadsheetMetadata>;

    /// Stores metadata under the id it carries.
    async fn save(&self, metadata: SpreadsheetMetadata) -> StoreResult<SpreadsheetMetadata>;

    /// Deletes metadata, returning `true` if it existed.
    async fn delete(&self, id: SpreadsheetId) -> StoreResult<bool>;

    /// Finds spreadsheets whose name contains `name`, case-insensitively.
    async fn find_by_name(
        &self,
        name: &str,
        offset: usize,
        count: usize,
    ) -> StoreResult<Vec<SpreadsheetMetadata>>;

    /// Lists spreadsheets in id order.
    async fn all(&self, offset: usize, count: usize) -> StoreResult<Vec<SpreadsheetMetadata>>;
}

/// A [`MetadataStore`] held in memory.
///
/// Ids are assigned sequentially from 1; saving under an explicit id moves
/// the sequence past it.
#[derive(Debug)]
pub struct MemoryMetadataStore {
    entries: RwLock<BTreeMap<SpreadsheetId, SpreadsheetMetadata>>,
    next_id: AtomicU64,
}

impl MemoryMetadataStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns the number of stored spreadsheets.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for MemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn load(&self, id: SpreadsheetId) -> StoreResult<Option<SpreadsheetMetadata>> {
        Ok(self.entries.read().get(&id).cloned())
    }

    async fn create(&self, mut metadata: SpreadsheetMetadata) -> StoreResult<SpreadsheetMetadata> {
        let id = SpreadsheetId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        metadata.id = Some(id);
        self.entries.write().insert(id, metadata.clone());

        tracing::debug!(spreadsheet = %id, name = %metadata.name, "Created spreadsheet metadata");
        Ok(metadata)
    }

    async fn save(&self, metadata: SpreadsheetMetadata) -> StoreResult<SpreadsheetMetadata> {
        let id = metadata
            .id
            .ok_or_else(|| StoreError::invalid("metadata", "saving requires an id"))?;
        self.next_id
            .fetch_max(id.value().saturating_add(1), Ordering::SeqCst);
        self.entries.write().insert(id, metadata.clone());
        Ok(metadata)
    }

    async fn delete(&self, id: SpreadsheetId) -> StoreResult<bool> {
        Ok(self.entries.write().remove(&id).is_some())
    }

    async fn find_by_name(
        &self,
        name: &str,
        offset: usize,
        count: usize,
    ) -> StoreResult<Vec<SpreadsheetMetadata>> {
        let needle = name.to_lowercase();
        Ok(self
            .entries
            .read()
            .values()
            .filter(|m| m.name.to_lowercase().contains(&needle))
            .skip(offset)
            .take(count)
            .cloned()
            .collect())
    }

    async fn all(&self, offset: usize, count: usize) -> StoreResult<Vec<SpreadsheetMetadata>> {
        Ok(self
            .entries
            .read()
            .values()
            .skip(offset)
            .take(count)
            .cloned()
            .collect())
    }
}
