//! Tabulon Persistence Layer
//!
//! This crate holds everything about a spreadsheet that does not involve
//! HTTP: how cells, ranges and labels are addressed, the documents stored
//! per spreadsheet, the in-memory stores, and the formula engine.
//!
//! # Architecture
//!
//! - [`id`] - The [`SpreadsheetId`] every spreadsheet is keyed by
//! - [`reference`] - Cell, column, row, range and label references
//! - [`model`] - Cells, columns, rows, metadata and the delta document
//! - [`store`] - In-memory stores and the per-spreadsheet [`StoreRepository`]
//! - [`engine`] - The [`SpreadsheetEngine`] trait and [`BasicEngine`]
//! - [`error`] - Error types for all operations
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use tabulon_persistence::engine::{BasicEngine, EngineEvaluation, SpreadsheetEngine};
//! use tabulon_persistence::model::{SpreadsheetCell, SpreadsheetDelta};
//! use tabulon_persistence::reference::{CellRange, CellReference};
//! use tabulon_persistence::store::{MemoryMetadataStore, StoreRepository};
//!
//! let repository = StoreRepository::new(Arc::new(MemoryMetadataStore::new()));
//! let a1 = CellReference::parse("A1").unwrap();
//!
//! let delta = SpreadsheetDelta::new().with_cell(a1, SpreadsheetCell::with_text("=1+2"));
//! BasicEngine.save_cells(&delta, &repository).unwrap();
//!
//! let loaded = BasicEngine
//!     .load_cells(&[CellRange::single(a1)], EngineEvaluation::ComputeIfNecessary, &repository)
//!     .unwrap();
//! assert_eq!(loaded.cells[&a1].formula.value, Some(serde_json::json!(3)));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod engine;
pub mod error;
pub mod id;
pub mod model;
pub mod reference;
pub mod store;

// Re-export commonly used types at crate root
pub use engine::{BasicEngine, EngineEvaluation, SpreadsheetEngine};
pub use error::{LabelError, ReferenceError, StoreError, StoreResult};
pub use id::SpreadsheetId;
pub use model::{SpreadsheetDelta, SpreadsheetMetadata};
pub use store::{MemoryMetadataStore, MetadataStore, StoreRepository};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
