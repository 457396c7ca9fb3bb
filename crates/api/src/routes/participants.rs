//! Participant mutation endpoints.
//!
//! Every mutating handler follows the same ordering: the row's in-flight
//! flag is set under the session lock before the backend call is
//! dispatched, the lock is released across the await, and the flag is
//! cleared once the call resolves. Deletion is confirmed-then-removed:
//! rows disappear only after the backend acknowledged and the next fetch
//! no longer returns them.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain::models::{
    Attribute, AttributeValue, Block, CreateParticipantRequest, Participant, ParticipantId,
    UpdateParticipantRequest,
};

use crate::app::AppState;
use crate::error::{ApiError, ValidationDetail};
use crate::extractors::{ApiKeyAuth, PanelSession};
use crate::sessions::SessionKey;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteRequest {
    pub ids: Vec<ParticipantId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: ParticipantId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteResponse {
    pub deleted: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandResponse {
    pub id: ParticipantId,
    pub blocks: Vec<Block>,
}

fn session_key(session: PanelSession, event_id: i64) -> SessionKey {
    SessionKey {
        session: session.0,
        event: event_id,
    }
}

/// Check every submitted value against the event's attribute schema.
///
/// Field names in the reported details are attribute ids in their wire
/// form, so the frontend can attach errors next to the offending cell.
fn validate_values(
    attributes: &[Attribute],
    values: &BTreeMap<domain::models::AttributeId, AttributeValue>,
) -> Result<(), ApiError> {
    let mut details = Vec::new();

    for (id, value) in values {
        match attributes.iter().find(|a| a.id == *id) {
            Some(attribute) => {
                if let Err(err) = attribute.validate_value(value) {
                    details.push(ValidationDetail {
                        field: id.to_string(),
                        message: err
                            .message
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "Invalid value".to_string()),
                    });
                }
            }
            None => details.push(ValidationDetail {
                field: id.to_string(),
                message: "Unknown attribute".to_string(),
            }),
        }
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(ApiError::ValidationDetailed(details))
    }
}

/// POST /api/v1/events/{event_id}/participants
pub async fn create_participant(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    _session: PanelSession,
    Path(event_id): Path<i64>,
    Json(request): Json<CreateParticipantRequest>,
) -> Result<(StatusCode, Json<Participant>), ApiError> {
    request.validate()?;

    if !request.values.is_empty() {
        let attributes = state.attributes.list(event_id).await?;
        validate_values(&attributes, &request.values)?;
    }

    let participant = state.participants.create(event_id, &request).await?;
    Ok((StatusCode::CREATED, Json(participant)))
}

/// POST /api/v1/events/{event_id}/participants/{participant_id}/edit
pub async fn begin_edit(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    session: PanelSession,
    Path((event_id, participant_id)): Path<(i64, ParticipantId)>,
) -> Result<StatusCode, ApiError> {
    let controller = state.sessions.get_or_create(session_key(session, event_id));
    controller.lock().unwrap().begin_edit(participant_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/events/{event_id}/participants/{participant_id}/cancel
pub async fn cancel_edit(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    session: PanelSession,
    Path((event_id, participant_id)): Path<(i64, ParticipantId)>,
) -> Result<StatusCode, ApiError> {
    let controller = state.sessions.get_or_create(session_key(session, event_id));
    controller.lock().unwrap().cancel_edit(participant_id);
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/events/{event_id}/participants/{participant_id}
///
/// Saves a row's inline edits. On success the row returns to view mode;
/// on failure it stays editable so the user can retry explicitly.
pub async fn save_participant(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    session: PanelSession,
    Path((event_id, participant_id)): Path<(i64, ParticipantId)>,
    Json(request): Json<UpdateParticipantRequest>,
) -> Result<Json<Participant>, ApiError> {
    request.validate()?;

    if !request.values.is_empty() {
        let attributes = state.attributes.list(event_id).await?;
        validate_values(&attributes, &request.values)?;
    }

    let controller = state.sessions.get_or_create(session_key(session, event_id));
    controller.lock().unwrap().begin_mutation(participant_id)?;

    let result = state
        .participants
        .update(event_id, participant_id, &request)
        .await;

    let mut guard = controller.lock().unwrap();
    guard.finish_mutation(participant_id);
    match result {
        Ok(participant) => {
            guard.finish_edit(participant_id);
            drop(guard);
            Ok(Json(participant))
        }
        Err(err) => Err(err.into()),
    }
}

/// POST /api/v1/events/{event_id}/participants/{participant_id}/expand
///
/// Marks the row detail as opened and fetches its block assignments,
/// which are too expensive to load for every row up front.
pub async fn expand_participant(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    session: PanelSession,
    Path((event_id, participant_id)): Path<(i64, ParticipantId)>,
) -> Result<Json<ExpandResponse>, ApiError> {
    let controller = state.sessions.get_or_create(session_key(session, event_id));
    controller.lock().unwrap().mark_expanded(participant_id);

    let blocks = state.blocks.assignments(event_id, participant_id).await?;
    Ok(Json(ExpandResponse {
        id: participant_id,
        blocks,
    }))
}

/// DELETE /api/v1/events/{event_id}/participants/{participant_id}
pub async fn delete_participant(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    session: PanelSession,
    Path((event_id, participant_id)): Path<(i64, ParticipantId)>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let controller = state.sessions.get_or_create(session_key(session, event_id));
    controller.lock().unwrap().begin_mutation(participant_id)?;

    let result = state.participants.delete(event_id, participant_id).await;

    let mut guard = controller.lock().unwrap();
    guard.finish_mutation(participant_id);
    match result {
        Ok(()) => {
            guard.forget_row(participant_id);
            drop(guard);
            Ok(Json(DeleteResponse {
                deleted: true,
                id: participant_id,
            }))
        }
        Err(err) => Err(err.into()),
    }
}

/// DELETE /api/v1/events/{event_id}/participants
///
/// Bulk delete. Ids are independent rows, but the whole set goes to the
/// backend as one call; any row already mid-mutation rejects the whole
/// request before anything is dispatched.
pub async fn delete_many_participants(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    session: PanelSession,
    Path(event_id): Path<i64>,
    Json(request): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>, ApiError> {
    if request.ids.is_empty() {
        return Err(ApiError::Validation("No participant ids given".to_string()));
    }
    let cap = state.config.limits.max_bulk_delete;
    if request.ids.len() > cap {
        return Err(ApiError::Validation(format!(
            "At most {} participants can be deleted at once",
            cap
        )));
    }

    let controller = state.sessions.get_or_create(session_key(session, event_id));
    {
        let mut guard = controller.lock().unwrap();
        let mut flagged = Vec::with_capacity(request.ids.len());
        for id in &request.ids {
            match guard.begin_mutation(*id) {
                Ok(()) => flagged.push(*id),
                Err(err) => {
                    // Roll back the rows flagged so far; nothing was sent yet.
                    for id in flagged {
                        guard.finish_mutation(id);
                    }
                    return Err(err.into());
                }
            }
        }
    }

    let result = state.participants.delete_many(event_id, &request.ids).await;

    let mut guard = controller.lock().unwrap();
    for id in &request.ids {
        guard.finish_mutation(*id);
    }
    match result {
        Ok(()) => {
            for id in &request.ids {
                guard.forget_row(*id);
            }
            drop(guard);
            Ok(Json(BulkDeleteResponse {
                deleted: request.ids.len(),
            }))
        }
        Err(err) => Err(err.into()),
    }
}
