//! Block endpoints of the backend API.

use reqwest::Method;

use domain::models::{Block, ParticipantId};

use crate::client::BackendClient;
use crate::error::BackendError;

/// Typed access to `/events/{id}/blocks`.
#[derive(Debug, Clone)]
pub struct BlocksApi {
    client: BackendClient,
}

impl BlocksApi {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    /// Fetch the blocks defined for an event.
    pub async fn list(&self, event_id: i64) -> Result<Vec<Block>, BackendError> {
        self.client
            .request_json(
                "list_blocks",
                Method::GET,
                &format!("/events/{}/blocks", event_id),
                None::<&()>,
            )
            .await
    }

    /// Fetch one participant's block assignments.
    ///
    /// Expensive on the backend side; fetched lazily when a row detail
    /// is expanded for the first time.
    pub async fn assignments(
        &self,
        event_id: i64,
        participant_id: ParticipantId,
    ) -> Result<Vec<Block>, BackendError> {
        self.client
            .request_json(
                "list_block_assignments",
                Method::GET,
                &format!(
                    "/events/{}/participants/{}/blocks",
                    event_id, participant_id
                ),
                None::<&()>,
            )
            .await
    }
}
