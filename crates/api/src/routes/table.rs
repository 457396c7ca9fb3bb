//! Table state and projection endpoints.
//!
//! The table pipeline: fetch attributes, participants and blocks from
//! the backend, flatten, generate columns, then project through the
//! caller's session controller. State mutations are small synchronous
//! endpoints; the next GET renders the updated view.

use std::collections::BTreeSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use domain::models::{flatten, ParticipantId};
use domain::table::{generate_columns, project, ColumnKey, TableView};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiKeyAuth, PanelSession};
use crate::sessions::SessionKey;

/// Locale used to resolve attribute labels for column headers.
const PANEL_LOCALE: &str = "pl";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortRequest {
    pub column: ColumnKey,
    /// Add to the multi-sort chain instead of replacing it.
    #[serde(default)]
    pub append: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FilterRequest {
    /// Case-insensitive substring across all visible columns.
    Global {
        #[serde(default)]
        text: String,
    },
    /// Membership in a chosen subset of a column's options.
    Discrete {
        column: ColumnKey,
        values: BTreeSet<String>,
    },
    /// Substring match on one column.
    Substring {
        column: ColumnKey,
        #[serde(default)]
        text: String,
    },
    /// Drop one column's filter, or all filters when no column given.
    Clear {
        #[serde(default)]
        column: Option<ColumnKey>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequestBody {
    pub page: usize,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum SelectionRequest {
    /// Toggle one row's selection.
    Toggle { id: ParticipantId },
    /// Select every listed row (the client sends the visible ids).
    All { ids: Vec<ParticipantId> },
    /// Clear the selection.
    Clear,
}

fn session_key(session: PanelSession, event_id: i64) -> SessionKey {
    SessionKey {
        session: session.0,
        event: event_id,
    }
}

/// GET /api/v1/events/{event_id}/table
pub async fn get_table(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    session: PanelSession,
    Path(event_id): Path<i64>,
) -> Result<Json<TableView>, ApiError> {
    // A fetch failure surfaces as an error response with no partial data.
    let (attributes, participants, blocks) = tokio::try_join!(
        state.attributes.list(event_id),
        state.participants.list(event_id),
        state.blocks.list(event_id),
    )?;

    let columns = generate_columns(&attributes, &blocks, PANEL_LOCALE);
    let rows = flatten(&participants);

    let controller = state.sessions.get_or_create(session_key(session, event_id));
    let controller = controller.lock().unwrap();
    Ok(Json(project(&columns, &rows, &controller)))
}

/// POST /api/v1/events/{event_id}/table/sort
pub async fn sort(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    session: PanelSession,
    Path(event_id): Path<i64>,
    Json(request): Json<SortRequest>,
) -> Result<StatusCode, ApiError> {
    let controller = state.sessions.get_or_create(session_key(session, event_id));
    controller
        .lock()
        .unwrap()
        .toggle_sort(request.column, request.append)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/events/{event_id}/table/filter
pub async fn filter(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    session: PanelSession,
    Path(event_id): Path<i64>,
    Json(request): Json<FilterRequest>,
) -> Result<StatusCode, ApiError> {
    let controller = state.sessions.get_or_create(session_key(session, event_id));
    let mut controller = controller.lock().unwrap();
    match request {
        FilterRequest::Global { text } => controller.set_global_filter(text),
        FilterRequest::Discrete { column, values } => {
            controller.set_discrete_filter(column, values)
        }
        FilterRequest::Substring { column, text } => {
            controller.set_substring_filter(column, text)
        }
        FilterRequest::Clear { column } => controller.clear_filters(column),
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/events/{event_id}/table/page
pub async fn page(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    session: PanelSession,
    Path(event_id): Path<i64>,
    Json(request): Json<PageRequestBody>,
) -> Result<StatusCode, ApiError> {
    let controller = state.sessions.get_or_create(session_key(session, event_id));
    controller.lock().unwrap().set_page(request.page);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/events/{event_id}/table/selection
pub async fn selection(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    session: PanelSession,
    Path(event_id): Path<i64>,
    Json(request): Json<SelectionRequest>,
) -> Result<StatusCode, ApiError> {
    let controller = state.sessions.get_or_create(session_key(session, event_id));
    let mut controller = controller.lock().unwrap();
    match request {
        SelectionRequest::Toggle { id } => controller.toggle_selection(id),
        SelectionRequest::All { ids } => controller.select_all(ids),
        SelectionRequest::Clear => controller.clear_selection(),
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/events/{event_id}/table/reset
pub async fn reset(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    session: PanelSession,
    Path(event_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let controller = state.sessions.get_or_create(session_key(session, event_id));
    controller.lock().unwrap().reset();
    Ok(StatusCode::NO_CONTENT)
}
