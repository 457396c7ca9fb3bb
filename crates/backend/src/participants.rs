//! Participant endpoints of the backend API.

use reqwest::Method;
use serde::Serialize;

use domain::models::{
    CreateParticipantRequest, Participant, ParticipantId, UpdateParticipantRequest,
};

use crate::client::BackendClient;
use crate::error::BackendError;

/// Typed access to `/events/{id}/participants`.
#[derive(Debug, Clone)]
pub struct ParticipantsApi {
    client: BackendClient,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BulkDeleteBody<'a> {
    participant_ids: &'a [ParticipantId],
}

impl ParticipantsApi {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    /// Fetch the full participant list for an event.
    pub async fn list(&self, event_id: i64) -> Result<Vec<Participant>, BackendError> {
        self.client
            .request_json(
                "list_participants",
                Method::GET,
                &format!("/events/{}/participants", event_id),
                None::<&()>,
            )
            .await
    }

    /// Register a new participant.
    pub async fn create(
        &self,
        event_id: i64,
        request: &CreateParticipantRequest,
    ) -> Result<Participant, BackendError> {
        self.client
            .request_json(
                "create_participant",
                Method::POST,
                &format!("/events/{}/participants", event_id),
                Some(request),
            )
            .await
    }

    /// Save edits to one participant.
    pub async fn update(
        &self,
        event_id: i64,
        id: ParticipantId,
        request: &UpdateParticipantRequest,
    ) -> Result<Participant, BackendError> {
        self.client
            .request_json(
                "update_participant",
                Method::PATCH,
                &format!("/events/{}/participants/{}", event_id, id),
                Some(request),
            )
            .await
    }

    /// Delete one participant. The caller removes the row only after
    /// this resolves successfully.
    pub async fn delete(&self, event_id: i64, id: ParticipantId) -> Result<(), BackendError> {
        self.client
            .request_no_content(
                "delete_participant",
                Method::DELETE,
                &format!("/events/{}/participants/{}", event_id, id),
                None::<&()>,
            )
            .await
    }

    /// Delete a set of participants in one call.
    pub async fn delete_many(
        &self,
        event_id: i64,
        ids: &[ParticipantId],
    ) -> Result<(), BackendError> {
        self.client
            .request_no_content(
                "delete_many_participants",
                Method::DELETE,
                &format!("/events/{}/participants", event_id),
                Some(&BulkDeleteBody {
                    participant_ids: ids,
                }),
            )
            .await
    }
}
