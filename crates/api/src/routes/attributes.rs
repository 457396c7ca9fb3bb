//! Attribute schema endpoint handler.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use domain::models::{listed, Attribute, AttributeId};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ApiKeyAuth;

/// Schema projection returned to the frontend.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributesResponse {
    /// Every attribute defined for the event, in listed order.
    pub attributes: Vec<Attribute>,
    /// Ids of the attributes that render as table columns.
    pub listed: Vec<AttributeId>,
}

/// GET /api/v1/events/{event_id}/attributes
pub async fn get_attributes(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    Path(event_id): Path<i64>,
) -> Result<Json<AttributesResponse>, ApiError> {
    let attributes = state.attributes.list(event_id).await?;
    let listed = listed(&attributes).iter().map(|a| a.id).collect();

    Ok(Json(AttributesResponse { attributes, listed }))
}
