//! The `column` resource: column records and widths.

use axum::http::Method;
use tabulon_persistence::model::SpreadsheetDelta;
use tabulon_persistence::reference::{ColumnRange, ColumnReference};
use tabulon_persistence::store::StoreRepository;

use super::{canonicalize_keys, merge_patch, required, respond};
use crate::dispatch::{HandlerContext, LinkRelation, RequestBody, ResourceMapping, Selection};
use crate::error::{RestError, RestResult};
use crate::marshall::Marshalled;

type Body = Option<RequestBody<SpreadsheetDelta>>;

/// Builds the `column` mapping.
pub fn mapping() -> ResourceMapping<ColumnReference, SpreadsheetDelta> {
    ResourceMapping::new("column", ColumnReference::parse, true)
        .handle(LinkRelation::SELF, Method::GET, load)
        .handle(LinkRelation::SELF, Method::POST, save)
        .handle(LinkRelation::SELF, Method::PATCH, patch)
        .handle(LinkRelation::SELF, Method::DELETE, delete)
}

fn ranges(selection: &Selection<ColumnReference>) -> Vec<ColumnRange> {
    match selection {
        Selection::None | Selection::All => {
            vec![ColumnRange::new(ColumnReference::FIRST, ColumnReference::LAST)]
        }
        Selection::One(column) => vec![ColumnRange::new(*column, *column)],
        Selection::Many(columns) => columns
            .iter()
            .map(|column| ColumnRange::new(*column, *column))
            .collect(),
        Selection::Range(begin, end) => vec![ColumnRange::new(*begin, *end)],
    }
}

fn load_ranges(repository: &StoreRepository, ranges: &[ColumnRange]) -> SpreadsheetDelta {
    let mut delta = SpreadsheetDelta::new();
    for range in ranges {
        let loaded = repository.load_columns(*range);
        delta.columns.extend(loaded.columns);
        delta.column_widths.extend(loaded.column_widths);
    }
    delta
}

fn load(
    selection: Selection<ColumnReference>,
    _: Body,
    context: &HandlerContext,
) -> RestResult<Option<Marshalled>> {
    respond(context, load_ranges(context.repository(), &ranges(&selection)))
}

fn save(
    _: Selection<ColumnReference>,
    body: Body,
    context: &HandlerContext,
) -> RestResult<Option<Marshalled>> {
    let delta = required(body)?.decode()?;
    respond(context, context.repository().save_columns(&delta)?)
}

fn patch(
    selection: Selection<ColumnReference>,
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
    for field in ["columns", "columnWidths"] {
        ranges.extend(
            canonicalize_keys(&mut patch, field, ColumnReference::parse)?
                .into_iter()
                .map(|column| ColumnRange::new(column, column)),
        );
    }

    let current = load_ranges(repository, &ranges);
    let merged: SpreadsheetDelta = merge_patch(&current, &patch)?;
    let mut saved = repository.save_columns(&merged)?;

    for column in current.columns.keys() {
        if !merged.columns.contains_key(column) {
            repository.columns.delete(column);
        }
    }
    for column in current.column_widths.keys() {
        if !merged.column_widths.contains_key(column) {
            repository.column_widths.delete(column);
        }
    }
    saved.deleted_columns.extend(
        current
            .columns
            .keys()
            .chain(current.column_widths.keys())
            .filter(|c| !merged.columns.contains_key(*c) && !merged.column_widths.contains_key(*c)),
    );
    respond(context, saved)
}

fn delete(
    selection: Selection<ColumnReference>,
    _: Body,
    context: &HandlerContext,
) -> RestResult<Option<Marshalled>> {
    if selection.is_none() {
        return Err(RestError::bad_request("Deleting columns requires a selection"));
    }
    let repository = context.repository();
    let mut deleted = SpreadsheetDelta::new();
    for range in ranges(&selection) {
        deleted
            .deleted_columns
            .extend(repository.delete_columns(range).deleted_columns);
    }
    respond(context, deleted)
}
