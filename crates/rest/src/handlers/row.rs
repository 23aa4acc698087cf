//! The `row` resource: row records and heights.

use axum::http::Method;
use tabulon_persistence::model::SpreadsheetDelta;
use tabulon_persistence::reference::{RowRange, RowReference};
use tabulon_persistence::store::StoreRepository;

use super::{canonicalize_keys, merge_patch, required, respond};
use crate::dispatch::{HandlerContext, LinkRelation, RequestBody, ResourceMapping, Selection};
use crate::error::{RestError, RestResult};
use crate::marshall::Marshalled;

type Body = Option<RequestBody<SpreadsheetDelta>>;

/// Builds the `row` mapping.
pub fn mapping() -> ResourceMapping<RowReference, SpreadsheetDelta> {
    ResourceMapping::new("row", RowReference::parse, true)
        .handle(LinkRelation::SELF, Method::GET, load)
        .handle(LinkRelation::SELF, Method::POST, save)
        .handle(LinkRelation::SELF, Method::PATCH, patch)
        .handle(LinkRelation::SELF, Method::DELETE, delete)
}

fn ranges(selection: &Selection<RowReference>) -> Vec<RowRange> {
    match selection {
        Selection::None | Selection::All => {
            vec![RowRange::new(RowReference::FIRST, RowReference::LAST)]
        }
        Selection::One(row) => vec![RowRange::new(*row, *row)],
        Selection::Many(rows) => rows
            .iter()
            .map(|row| RowRange::new(*row, *row))
            .collect(),
        Selection::Range(begin, end) => vec![RowRange::new(*begin, *end)],
    }
}

fn load_ranges(repository: &StoreRepository, ranges: &[RowRange]) -> SpreadsheetDelta {
    let mut delta = SpreadsheetDelta::new();
    for range in ranges {
        let loaded = repository.load_rows(*range);
        delta.rows.extend(loaded.rows);
        delta.row_heights.extend(loaded.row_heights);
    }
    delta
}

fn load(
    selection: Selection<RowReference>,
    _: Body,
    context: &HandlerContext,
) -> RestResult<Option<Marshalled>> {
    respond(context, load_ranges(context.repository(), &ranges(&selection)))
}

fn save(
    _: Selection<RowReference>,
    body: Body,
    context: &HandlerContext,
) -> RestResult<Option<Marshalled>> {
    let delta = required(body)?.decode()?;
    respond(context, context.repository().save_rows(&delta)?)
}

fn patch(
    selection: Selection<RowReference>,
    body: Body,
    context: &HandlerContext,
) -> RestResult<Option<Marshalled>> {
    let mut patch = required(body)?.into_value();
    if !patch.is_object() {
        return Err(RestError::bad_request("Patch must be a JSON object"));
    }
    let repository = context.repository();

    let mut ranges = if selection.is_none() {
        Vec::new()
    } else {
        ranges(&selection)
    };
    for field in ["rows", "rowHeights"] {
        ranges.extend(
            canonicalize_keys(&mut patch, field, RowReference::parse)?
                .into_iter()
                .map(|row| RowRange::new(row, row)),
        );
    }

    let current = load_ranges(repository, &ranges);
    let merged: SpreadsheetDelta = merge_patch(&current, &patch)?;
    let mut saved = repository.save_rows(&merged)?;

    for row in current.rows.keys() {
        if !merged.rows.contains_key(row) {
            repository.rows.delete(row);
        }
    }
    for row in current.row_heights.keys() {
        if !merged.row_heights.contains_key(row) {
            repository.row_heights.delete(row);
        }
    }
    saved.deleted_rows.extend(
        current
            .rows
            .keys()
            .chain(current.row_heights.keys())
            .filter(|r| !merged.rows.contains_key(*r) && !merged.row_heights.contains_key(*r)),
    );
    respond(context, saved)
}

fn delete(
    selection: Selection<RowReference>,
    _: Body,
    context: &HandlerContext,
) -> RestResult<Option<Marshalled>> {
    if selection.is_none() {
        return Err(RestError::bad_request("Deleting rows requires a selection"));
    }
    let repository = context.repository();
    let mut deleted = SpreadsheetDelta::new();
    for range in ranges(&selection) {
        deleted
            .deleted_rows
            .extend(repository.delete_rows(range).deleted_rows);
    }
    respond(context, deleted)
}
