//! The `cell` resource.
//!
//! | Method | Path | Action |
//! |--------|------|--------|
//! | GET | `cell/<selection>` | load, computing values where missing |
//! | GET | `cell/<selection>/<evaluation>` | load with the named evaluation |
//! | POST | `cell` | save the cells and labels of a delta |
//! | PATCH | `cell[/<selection>]` | merge a delta into the stored cells |
//! | DELETE | `cell/<selection>` | delete cells |
//!
//! Selections accept cell references, label names and ranges of either.

use axum::http::Method;
use tabulon_persistence::engine::EngineEvaluation;
use tabulon_persistence::error::{ReferenceError, StoreResult};
use tabulon_persistence::model::SpreadsheetDelta;
use tabulon_persistence::reference::{CellRange, CellReference, LabelName};
use tabulon_persistence::store::LabelStore;
use tracing::debug;

use super::{canonicalize_keys, merge_patch, required, respond};
use crate::dispatch::{HandlerContext, LinkRelation, RequestBody, ResourceMapping, Selection};
use crate::error::{RestError, RestResult};
use crate::marshall::Marshalled;

/// One item of a cell selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellSelector {
    /// A cell reference.
    Cell(CellReference),
    /// A label, resolved when the request runs.
    Label(LabelName),
}

impl CellSelector {
    /// Parses a cell reference or, failing that, a label name.
    pub fn parse(text: &str) -> Result<Self, ReferenceError> {
        match CellReference::try_parse(text) {
            Some(cell) => Ok(CellSelector::Cell(cell)),
            None => LabelName::parse(text).map(CellSelector::Label),
        }
    }

    /// The cells this selector covers.
    pub fn range(&self, labels: &LabelStore) -> StoreResult<CellRange> {
        match self {
            CellSelector::Cell(cell) => Ok(CellRange::single(*cell)),
            CellSelector::Label(label) => labels.resolve_range(label),
        }
    }
}

type Body = Option<RequestBody<SpreadsheetDelta>>;

/// Builds the `cell` mapping.
pub fn mapping() -> ResourceMapping<CellSelector, SpreadsheetDelta> {
    let mut mapping = ResourceMapping::new("cell", CellSelector::parse, true)
        .handle(LinkRelation::SELF, Method::GET, |selection, _, context| {
            load(selection, EngineEvaluation::ComputeIfNecessary, context)
        })
        .handle(LinkRelation::SELF, Method::POST, save)
        .handle(LinkRelation::SELF, Method::PATCH, patch)
        .handle(LinkRelation::SELF, Method::DELETE, delete);

    for evaluation in EngineEvaluation::ALL {
        mapping = mapping.handle(evaluation.into(), Method::GET, move |selection, _, context| {
            load(selection, evaluation, context)
        });
    }
    mapping
}

fn ranges(selection: &Selection<CellSelector>, labels: &LabelStore) -> RestResult<Vec<CellRange>> {
    let ranges = match selection {
        Selection::None | Selection::All => vec![CellRange::all()],
        Selection::One(selector) => vec![selector.range(labels)?],
        Selection::Many(selectors) => selectors
            .iter()
            .map(|selector| selector.range(labels))
            .collect::<StoreResult<_>>()?,
        Selection::Range(begin, end) => vec![CellRange::new(
            begin.range(labels)?.begin(),
            end.range(labels)?.end(),
        )],
    };
    Ok(ranges)
}

fn load(
    selection: Selection<CellSelector>,
    evaluation: EngineEvaluation,
    context: &HandlerContext,
) -> RestResult<Option<Marshalled>> {
    let repository = context.repository();
    let ranges = ranges(&selection, &repository.labels)?;
    let loaded = context.engine().load_cells(&ranges, evaluation, repository)?;
    respond(context, loaded)
}

fn save(
    _: Selection<CellSelector>,
    body: Body,
    context: &HandlerContext,
) -> RestResult<Option<Marshalled>> {
    let delta = required(body)?.decode()?;
    let saved = context.engine().save_cells(&delta, context.repository())?;
    respond(context, saved)
}

/// Merges the patch into the cells it names plus the selected cells.
///
/// Cells and labels present before the merge and absent after it are
/// deleted, so `{"cells": {"B2": null}}` removes `B2`.
fn patch(
    selection: Selection<CellSelector>,
    body: Body,
    context: &HandlerContext,
) -> RestResult<Option<Marshalled>> {
    let mut patch = required(body)?.into_value();
    if !patch.is_object() {
        return Err(RestError::bad_request("Patch must be a JSON object"));
    }
    let repository = context.repository();
    let engine = context.engine();

    let mut ranges = if selection.is_none() {
        Vec::new()
    } else {
        ranges(&selection, &repository.labels)?
    };
    ranges.extend(
        canonicalize_keys(&mut patch, "cells", CellReference::parse)?
            .into_iter()
            .map(CellRange::single),
    );

    let current = engine.load_cells(&ranges, EngineEvaluation::SkipEvaluate, repository)?;
    let mut merged: SpreadsheetDelta = merge_patch(&current, &patch)?;

    let removed_cells: Vec<CellReference> = current
        .cells
        .keys()
        .filter(|cell| !merged.cells.contains_key(*cell))
        .copied()
        .collect();
    merged.deleted_cells.extend(removed_cells);
    for mapping in &current.labels {
        if !merged.labels.iter().any(|m| m.label == mapping.label) {
            merged.deleted_labels.insert(mapping.label.clone());
        }
    }

    debug!(
        spreadsheet = %context.tenant().id(),
        cells = merged.cells.len(),
        deleted = merged.deleted_cells.len(),
        "Patching cells"
    );
    let saved = engine.save_cells(&merged, repository)?;
    respond(context, saved)
}

fn delete(
    selection: Selection<CellSelector>,
    _: Body,
    context: &HandlerContext,
) -> RestResult<Option<Marshalled>> {
    if selection.is_none() {
        return Err(RestError::bad_request("Deleting cells requires a selection"));
    }
    let repository = context.repository();
    let ranges = ranges(&selection, &repository.labels)?;
    let deleted = context.engine().delete_cells(&ranges, repository)?;
    respond(context, deleted)
}
