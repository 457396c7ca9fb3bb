//! Attribute schema endpoints of the backend API.

use reqwest::Method;

use domain::models::Attribute;

use crate::client::BackendClient;
use crate::error::BackendError;

/// Typed access to `/events/{id}/attributes`.
#[derive(Debug, Clone)]
pub struct AttributesApi {
    client: BackendClient,
}

impl AttributesApi {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    /// Fetch the attribute schema for an event, in listed order.
    pub async fn list(&self, event_id: i64) -> Result<Vec<Attribute>, BackendError> {
        self.client
            .request_json(
                "list_attributes",
                Method::GET,
                &format!("/events/{}/attributes", event_id),
                None::<&()>,
            )
            .await
    }
}
