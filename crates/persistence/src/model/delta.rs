//! The delta document exchanged by cell, column, row and label operations.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::cell::SpreadsheetCell;
use super::column_row::{SpreadsheetColumn, SpreadsheetRow};
use crate::reference::{CellReference, ColumnReference, LabelMapping, LabelName, RowReference};

/// A partial view of a spreadsheet: the entries a request supplied or an
/// operation touched.
///
/// Every field is optional on input and omitted on output when empty, so a
/// client PATCHing `{"cells": {...}}` only talks about cells.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetDelta {
    /// Cells keyed by reference.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cells: BTreeMap<CellReference, SpreadsheetCell>,

    /// Column records.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub columns: BTreeMap<ColumnReference, SpreadsheetColumn>,

    /// Row records.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rows: BTreeMap<RowReference, SpreadsheetRow>,

    /// Label mappings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<LabelMapping>,

    /// Cells that were or should be deleted.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub deleted_cells: BTreeSet<CellReference>,

    /// Columns that were or should be deleted.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub deleted_columns: BTreeSet<ColumnReference>,

    /// Rows that were or should be deleted.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub deleted_rows: BTreeSet<RowReference>,

    /// Labels that were or should be deleted.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub deleted_labels: BTreeSet<LabelName>,

    /// Column widths in pixels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub column_widths: BTreeMap<ColumnReference, f64>,

    /// Row heights in pixels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub row_heights: BTreeMap<RowReference, f64>,
}

impl SpreadsheetDelta {
    /// Creates an empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the delta carries nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Adds a cell.
    pub fn with_cell(mut self, reference: CellReference, cell: SpreadsheetCell) -> Self {
        self.cells.insert(reference, cell);
        self
    }

    /// Adds a label mapping.
    pub fn with_label(mut self, mapping: LabelMapping) -> Self {
        self.labels.push(mapping);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_fields_omitted() {
        let delta = SpreadsheetDelta::new();
        assert!(delta.is_empty());
        assert_eq!(serde_json::to_value(&delta).unwrap(), json!({}));
    }

    #[test]
    fn test_parse_full_document() {
        let delta: SpreadsheetDelta = serde_json::from_value(json!({
            "cells": {"b2": {"formula": {"text": "=1"}}},
            "columns": {"C": {"hidden": true}},
            "labels": [{"label": "Total", "reference": "B2"}],
            "deletedCells": ["A1"],
            "columnWidths": {"C": 120.0},
            "rowHeights": {"3": 30.0}
        }))
        .unwrap();

        let b2 = CellReference::parse("B2").unwrap();
        assert_eq!(delta.cells[&b2].formula.text, "=1");
        assert!(delta.columns[&ColumnReference::parse("C").unwrap()].hidden);
        assert_eq!(delta.labels.len(), 1);
        assert!(delta.deleted_cells.contains(&CellReference::parse("A1").unwrap()));
        assert_eq!(delta.row_heights[&RowReference::parse("3").unwrap()], 30.0);

        let json = serde_json::to_value(&delta).unwrap();
        assert_eq!(json["deletedCells"], json!(["A1"]));
        assert_eq!(json["cells"]["B2"]["formula"]["text"], "=1");
    }

    #[test]
    fn test_label_keyed_cells_rejected() {
        let result: Result<SpreadsheetDelta, _> =
            serde_json::from_value(json!({"cells": {"Total": {}}}));
        assert!(result.is_err());
    }
}
