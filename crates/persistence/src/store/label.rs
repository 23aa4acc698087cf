//! Label storage and resolution.

use std::collections::{BTreeMap, HashSet};

use parking_lot::RwLock;

use crate::error::{LabelError, StoreResult};
use crate::reference::{CellRange, CellReference, LabelMapping, LabelName, LabelTarget};

/// Stores label mappings for one spreadsheet and resolves labels to cells.
#[derive(Debug, Default)]
pub struct LabelStore {
    mappings: RwLock<BTreeMap<LabelName, LabelTarget>>,
}

impl LabelStore {
    /// Creates an empty label store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a mapping, failing with [`LabelError::NotFound`].
    pub fn load(&self, label: &LabelName) -> StoreResult<LabelMapping> {
        self.mappings
            .read()
            .get(label)
            .map(|target| LabelMapping::new(label.clone(), target.clone()))
            .ok_or_else(|| not_found(label).into())
    }

    /// Saves a mapping, rejecting one that would make a label refer to itself.
    pub fn save(&self, mapping: LabelMapping) -> StoreResult<LabelMapping> {
        self.save_all(std::slice::from_ref(&mapping))?;
        Ok(mapping)
    }

    /// Saves a batch of mappings as one change. If any of them would close a
    /// cycle, none are stored.
    pub fn save_all(&self, batch: &[LabelMapping]) -> StoreResult<Vec<LabelMapping>> {
        let mut mappings = self.mappings.write();
        let mut staged = mappings.clone();
        for mapping in batch {
            staged.insert(mapping.label.clone(), mapping.reference.clone());
        }

        for mapping in batch {
            if let Err(error @ LabelError::Cycle { .. }) = resolve(&staged, &mapping.label) {
                return Err(error.into());
            }
        }
        *mappings = staged;

        for mapping in batch {
            tracing::debug!(label = %mapping.label, reference = %mapping.reference, "Saved label");
        }
        Ok(batch.to_vec())
    }

    /// Removes a mapping, returning `true` if it existed.
    pub fn delete(&self, label: &LabelName) -> bool {
        self.mappings.write().remove(label).is_some()
    }

    /// Returns every mapping in label order.
    pub fn all(&self) -> Vec<LabelMapping> {
        self.mappings
            .read()
            .iter()
            .map(|(label, target)| LabelMapping::new(label.clone(), target.clone()))
            .collect()
    }

    /// Resolves a label to the range it ultimately refers to, following
    /// label chains. A cell target resolves to a single-cell range.
    pub fn resolve_range(&self, label: &LabelName) -> StoreResult<CellRange> {
        Ok(resolve(&self.mappings.read(), label)?)
    }

    /// Resolves a label to a single cell; a range resolves to its top-left.
    pub fn resolve_cell(&self, label: &LabelName) -> StoreResult<CellReference> {
        self.resolve_range(label).map(|range| range.begin())
    }

    /// Returns the mappings whose resolved range intersects any of `ranges`.
    pub fn mappings_within(&self, ranges: &[CellRange]) -> Vec<LabelMapping> {
        let mappings = self.mappings.read();
        mappings
            .iter()
            .filter(|(label, _)| {
                resolve(&mappings, label)
                    .map(|resolved| ranges.iter().any(|r| r.contains(&resolved.begin())))
                    .unwrap_or(false)
            })
            .map(|(label, target)| LabelMapping::new(label.clone(), target.clone()))
            .collect()
    }
}

fn not_found(label: &LabelName) -> LabelError {
    LabelError::NotFound {
        label: label.to_string(),
    }
}

fn resolve(
    mappings: &BTreeMap<LabelName, LabelTarget>,
    label: &LabelName,
) -> Result<CellRange, LabelError> {
    let mut visited = HashSet::new();
    let mut current = label;

    loop {
        if !visited.insert(current) {
            return Err(LabelError::Cycle {
                label: label.to_string(),
            });
        }
        match mappings.get(current).ok_or_else(|| not_found(current))? {
            LabelTarget::Cell(cell) => return Ok(CellRange::single(*cell)),
            LabelTarget::Range(range) => return Ok(*range),
            LabelTarget::Label(next) => current = next,
        }
    }
}
