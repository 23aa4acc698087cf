//! Spreadsheet metadata handlers.
//!
//! | Method | Path | Action |
//! |--------|------|--------|
//! | GET | `/api/spreadsheet?name=&offset=&count=` | list or find by name |
//! | POST | `/api/spreadsheet` | create |
//! | GET | `/api/spreadsheet/{id}` | load |
//! | PATCH | `/api/spreadsheet/{id}` | merge patch |
//! | DELETE | `/api/spreadsheet/{id}` | delete and evict |

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tabulon_persistence::id::SpreadsheetId;
use tabulon_persistence::model::SpreadsheetMetadata;
use tracing::{debug, info};

use super::merge_patch;
use crate::dispatch::user_of;
use crate::error::{RestError, RestResult};
use crate::middleware::require_json;
use crate::responses::{ResponseHeaders, marshalled_response};
use crate::state::AppState;

/// Query parameters of the listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Case-insensitive name fragment.
    pub name: Option<String>,
    /// Entries to skip.
    pub offset: Option<usize>,
    /// Page size, clamped to the configured maximum.
    pub count: Option<usize>,
}

/// Parses the `{id}` path segment.
pub(crate) fn parse_id(text: &str) -> RestResult<SpreadsheetId> {
    SpreadsheetId::parse(text)
        .map_err(|_| RestError::bad_request(format!("Invalid spreadsheet-id \"{}\"", text)))
}

async fn load_existing(state: &AppState, id: SpreadsheetId) -> RestResult<SpreadsheetMetadata> {
    state
        .metadata()
        .load(id)
        .await?
        .ok_or_else(|| RestError::not_found(format!("Spreadsheet {} not found", id)))
}

fn metadata_response(
    state: &AppState,
    status: StatusCode,
    metadata: &SpreadsheetMetadata,
    headers: ResponseHeaders,
) -> RestResult<Response> {
    let marshalled = state.marshall().marshall(metadata)?;
    Ok(marshalled_response(status, marshalled, headers))
}

/// Lists spreadsheets, optionally filtered by name.
///
/// # HTTP Request
///
/// `GET /api/spreadsheet?name=budget&offset=0&count=20`
pub async fn list_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> RestResult<Response> {
    let offset = params.offset.unwrap_or(0);
    let count = state.config().page_size(params.count);
    let name = params.name.as_deref().map(str::trim).filter(|n| !n.is_empty());

    debug!(name = ?name, offset, count, "Listing spreadsheets");
    let found = match name {
        Some(name) => state.metadata().find_by_name(name, offset, count).await?,
        None => state.metadata().all(offset, count).await?,
    };

    let marshalled = state.marshall().marshall(&found)?;
    Ok(marshalled_response(StatusCode::OK, marshalled, ResponseHeaders::new()))
}

/// Creates a spreadsheet.
///
/// An empty body creates an untitled spreadsheet. Any `id` in the body is
/// ignored; the store assigns one.
///
/// # Response
///
/// - `201 Created` - with `Location: {base}/api/spreadsheet/{id}`
/// - `400 Bad Request` - unknown locale, converter or formatter
/// - `415 Unsupported Media Type` - a body that is not JSON
pub async fn create_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> RestResult<Response> {
    let mut document = if body.is_empty() {
        Value::Object(Default::default())
    } else {
        require_json(&headers)?;
        serde_json::from_slice(&body)?
    };
    let Some(fields) = document.as_object_mut() else {
        return Err(RestError::bad_request("Spreadsheet metadata must be a JSON object"));
    };
    fields.remove("id");
    fields
        .entry("locale")
        .or_insert_with(|| Value::String(state.config().default_locale.clone()));

    let mut metadata: SpreadsheetMetadata = state.marshall().unmarshall(document)?;
    let now = Utc::now();
    metadata.created_at = now;
    metadata.modified_at = now;
    let metadata = metadata.with_creator(user_of(&headers).map(str::to_string));
    state.providers().provider_for(&metadata)?;

    let created = state.metadata().create(metadata).await?;
    let id = created.id.ok_or_else(|| RestError::InternalError {
        message: "Metadata store returned no id".to_string(),
    })?;
    info!(spreadsheet = %id, name = %created.name, "Created spreadsheet");

    let location = format!("{}/api/spreadsheet/{}", state.base_url(), id);
    metadata_response(
        &state,
        StatusCode::CREATED,
        &created,
        ResponseHeaders::new().with_location(location),
    )
}

/// Loads a spreadsheet's metadata.
pub async fn load_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> RestResult<Response> {
    let id = parse_id(&id)?;
    let metadata = load_existing(&state, id).await?;
    metadata_response(&state, StatusCode::OK, &metadata, ResponseHeaders::new())
}

/// Applies a JSON merge patch to a spreadsheet's metadata.
///
/// The id, creator and creation time cannot be changed. A cached tenant
/// context is replaced by a copy carrying the new metadata and providers,
/// so later requests see the change while in-flight ones finish with the
/// context they started with. Patches to one spreadsheet run one at a time.
pub async fn patch_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> RestResult<Response> {
    require_json(&headers)?;
    let id = parse_id(&id)?;
    let patch: Value = serde_json::from_slice(&body)?;
    if !patch.is_object() {
        return Err(RestError::bad_request("Patch must be a JSON object"));
    }

    let _guard = state.tenants().update_lock(id).await;
    let current = load_existing(&state, id).await?;
    let mut patched: SpreadsheetMetadata = merge_patch(&current, &patch)?;
    patched.id = current.id;
    patched.creator = current.creator.clone();
    patched.created_at = current.created_at;
    let provider = state.providers().provider_for(&patched)?;
    patched.touch(user_of(&headers).map(str::to_string));

    let saved = state.metadata().save(patched).await?;
    let published = state
        .tenants()
        .update(id, |tenant| tenant.with_metadata(saved.clone(), provider));
    debug!(spreadsheet = %id, replaced = published.is_some(), "Saved metadata");

    metadata_response(&state, StatusCode::OK, &saved, ResponseHeaders::new())
}

/// Deletes a spreadsheet and evicts its tenant context.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> RestResult<Response> {
    let id = parse_id(&id)?;
    let existed = state.metadata().delete(id).await?;
    let evicted = state.tenants().evict(id);
    state.dispatcher().forget(id);

    if !existed {
        return Err(RestError::not_found(format!("Spreadsheet {} not found", id)));
    }
    info!(spreadsheet = %id, evicted, "Deleted spreadsheet");
    Ok(StatusCode::NO_CONTENT.into_response())
}
