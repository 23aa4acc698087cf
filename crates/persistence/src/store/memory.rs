//! A generic keyed in-memory store.

use std::collections::BTreeMap;
use std::fmt::Display;

use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};

/// An ordered map behind a read-write lock.
///
/// Reads clone values out so no lock is held across caller code.
#[derive(Debug)]
pub struct MemoryStore<K, V> {
    kind: &'static str,
    entries: RwLock<BTreeMap<K, V>>,
}

impl<K, V> MemoryStore<K, V>
where
    K: Ord + Clone + Display,
    V: Clone,
{
    /// Creates an empty store. `kind` names the entries in errors.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Returns the entry or `None`.
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    /// Returns the entry, failing with [`StoreError::NotFound`].
    pub fn load(&self, key: &K) -> StoreResult<V> {
        self.get(key)
            .ok_or_else(|| StoreError::not_found(self.kind, key))
    }

    /// Inserts or replaces an entry, returning the previous value.
    pub fn save(&self, key: K, value: V) -> Option<V> {
        self.entries.write().insert(key, value)
    }

    /// Removes an entry, returning `true` if it existed.
    pub fn delete(&self, key: &K) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Returns every entry in key order.
    pub fn all(&self) -> Vec<(K, V)> {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Returns the entries whose key satisfies `predicate`.
    pub fn filter(&self, predicate: impl Fn(&K) -> bool) -> Vec<(K, V)> {
        self.entries
            .read()
            .iter()
            .filter(|(k, _)| predicate(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Removes the entries whose key satisfies `predicate`, returning their keys.
    pub fn delete_where(&self, predicate: impl Fn(&K) -> bool) -> Vec<K> {
        let mut entries = self.entries.write();
        let doomed: Vec<K> = entries.keys().filter(|k| predicate(k)).cloned().collect();
        for key in &doomed {
            entries.remove(key);
        }
        doomed
    }

    /// Applies `f` to every value in place.
    pub fn update_all(&self, mut f: impl FnMut(&K, &mut V)) {
        for (key, value) in self.entries.write().iter_mut() {
            f(key, value);
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
