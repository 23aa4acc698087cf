//! In-memory stores.
//!
//! - [`MemoryStore`] - a generic keyed store used for cells, columns and rows
//! - [`LabelStore`] - label mappings with transitive resolution
//! - [`MetadataStore`] / [`MemoryMetadataStore`] - spreadsheet metadata
//! - [`StoreRepository`] - the stores belonging to one spreadsheet

mod label;
mod memory;
mod metadata;
mod repository;

pub use label::LabelStore;
pub use memory::MemoryStore;
pub use metadata::{MemoryMetadataStore, MetadataStore};
pub use repository::StoreRepository;
