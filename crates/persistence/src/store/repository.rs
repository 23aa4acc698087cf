//! The per-spreadsheet bundle of stores.

use std::sync::Arc;

use crate::error::StoreResult;
use crate::model::{SpreadsheetCell, SpreadsheetColumn, SpreadsheetDelta, SpreadsheetRow};
use crate::reference::{
    CellReference, ColumnRange, ColumnReference, RowRange, RowReference,
};

use super::label::LabelStore;
use super::memory::MemoryStore;
use super::metadata::MetadataStore;

/// Every store belonging to one spreadsheet.
///
/// Cells are written through the engine, which keeps computed values
/// consistent. Columns, rows and their sizes are plain records and are
/// handled here.
pub struct StoreRepository {
    /// Cells keyed by reference.
    pub cells: MemoryStore<CellReference, SpreadsheetCell>,
    /// Label mappings.
    pub labels: LabelStore,
    /// Column records.
    pub columns: MemoryStore<ColumnReference, SpreadsheetColumn>,
    /// Row records.
    pub rows: MemoryStore<RowReference, SpreadsheetRow>,
    /// Column widths in pixels.
    pub column_widths: MemoryStore<ColumnReference, f64>,
    /// Row heights in pixels.
    pub row_heights: MemoryStore<RowReference, f64>,
    /// The shared metadata store.
    pub metadata: Arc<dyn MetadataStore>,
}

impl StoreRepository {
    /// Creates an empty repository sharing the given metadata store.
    pub fn new(metadata: Arc<dyn MetadataStore>) -> Self {
        Self {
            cells: MemoryStore::new("cell"),
            labels: LabelStore::new(),
            columns: MemoryStore::new("column"),
            rows: MemoryStore::new("row"),
            column_widths: MemoryStore::new("column width"),
            row_heights: MemoryStore::new("row height"),
            metadata,
        }
    }

    /// Loads the columns in `range` together with their widths.
    pub fn load_columns(&self, range: ColumnRange) -> SpreadsheetDelta {
        SpreadsheetDelta {
            columns: self
                .columns
                .filter(|c| range.contains(*c))
                .into_iter()
                .collect(),
            column_widths: self
                .column_widths
                .filter(|c| range.contains(*c))
                .into_iter()
                .collect(),
            ..Default::default()
        }
    }

    /// Saves the columns and widths in `delta`, returning what was written.
    ///
    /// Widths are validated before anything is written.
    pub fn save_columns(&self, delta: &SpreadsheetDelta) -> StoreResult<SpreadsheetDelta> {
        for width in delta.column_widths.values() {
            validate_size(*width)?;
        }
        for (column, record) in &delta.columns {
            self.columns.save(*column, *record);
        }
        for (column, width) in &delta.column_widths {
            self.column_widths.save(*column, *width);
        }
        for column in &delta.deleted_columns {
            self.columns.delete(column);
            self.column_widths.delete(column);
        }

        Ok(SpreadsheetDelta {
            columns: delta.columns.clone(),
            column_widths: delta.column_widths.clone(),
            deleted_columns: delta.deleted_columns.clone(),
            ..Default::default()
        })
    }

    /// Deletes the columns in `range`, returning the deleted references.
    pub fn delete_columns(&self, range: ColumnRange) -> SpreadsheetDelta {
        let mut deleted = self.columns.delete_where(|c| range.contains(*c));
        deleted.extend(self.column_widths.delete_where(|c| range.contains(*c)));

        SpreadsheetDelta {
            deleted_columns: deleted.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Loads the rows in `range` together with their heights.
    pub fn load_rows(&self, range: RowRange) -> SpreadsheetDelta {
        SpreadsheetDelta {
            rows: self.rows.filter(|r| range.contains(*r)).into_iter().collect(),
            row_heights: self
                .row_heights
                .filter(|r| range.contains(*r))
                .into_iter()
                .collect(),
            ..Default::default()
        }
    }

    /// Saves the rows and heights in `delta`, returning what was written.
    pub fn save_rows(&self, delta: &SpreadsheetDelta) -> StoreResult<SpreadsheetDelta> {
        for height in delta.row_heights.values() {
            validate_size(*height)?;
        }
        for (row, record) in &delta.rows {
            self.rows.save(*row, *record);
        }
        for (row, height) in &delta.row_heights {
            self.row_heights.save(*row, *height);
        }
        for row in &delta.deleted_rows {
            self.rows.delete(row);
            self.row_heights.delete(row);
        }

        Ok(SpreadsheetDelta {
            rows: delta.rows.clone(),
            row_heights: delta.row_heights.clone(),
            deleted_rows: delta.deleted_rows.clone(),
            ..Default::default()
        })
    }

    /// Deletes the rows in `range`, returning the deleted references.
    pub fn delete_rows(&self, range: RowRange) -> SpreadsheetDelta {
        let mut deleted = self.rows.delete_where(|r| range.contains(*r));
        deleted.extend(self.row_heights.delete_where(|r| range.contains(*r)));

        SpreadsheetDelta {
            deleted_rows: deleted.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for StoreRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreRepository")
            .field("cells", &self.cells.len())
            .field("labels", &self.labels.all().len())
            .field("columns", &self.columns.len())
            .field("rows", &self.rows.len())
            .finish_non_exhaustive()
    }
}

fn validate_size(size: f64) -> StoreResult<f64> {
    if size.is_finite() && size >= 0.0 {
        Ok(size)
    } else {
        Err(crate::error::StoreError::invalid(
            "size",
            format!("{size} is not a non-negative number"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryMetadataStore;

    fn repository() -> StoreRepository {
        StoreRepository::new(Arc::new(MemoryMetadataStore::new()))
    }

    fn column(text: &str) -> ColumnReference {
        ColumnReference::parse(text).unwrap()
    }

    #[test]
    fn test_columns_round_trip() {
        let repo = repository();
        let mut delta = SpreadsheetDelta::new();
        delta
            .columns
            .insert(column("B"), SpreadsheetColumn { hidden: true });
        delta.column_widths.insert(column("C"), 80.0);
        repo.save_columns(&delta).unwrap();

        let loaded = repo.load_columns(ColumnRange::parse("A:C").unwrap());
        assert!(loaded.columns[&column("B")].hidden);
        assert_eq!(loaded.column_widths[&column("C")], 80.0);

        let outside = repo.load_columns(ColumnRange::parse("D:E").unwrap());
        assert!(outside.is_empty());
    }

    #[test]
    fn test_delete_columns_reports_each_once() {
        let repo = repository();
        let mut delta = SpreadsheetDelta::new();
        delta.columns.insert(column("A"), SpreadsheetColumn::default());
        delta.column_widths.insert(column("A"), 50.0);
        repo.save_columns(&delta).unwrap();

        let deleted = repo.delete_columns(ColumnRange::parse("A").unwrap());
        assert_eq!(deleted.deleted_columns.len(), 1);
        assert!(repo.columns.is_empty());
        assert!(repo.column_widths.is_empty());
    }

    #[test]
    fn test_negative_height_rejected() {
        let repo = repository();
        let mut delta = SpreadsheetDelta::new();
        delta
            .row_heights
            .insert(RowReference::parse("1").unwrap(), -1.0);
        assert!(repo.save_rows(&delta).unwrap_err().is_invalid_input());
    }
}
