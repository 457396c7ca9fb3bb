//! Panel session extractor.
//!
//! Table state is ephemeral and keyed by the `X-Panel-Session` header, a
//! UUID minted by the frontend on table mount. Required on all table and
//! mutation routes.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Header carrying the panel session id.
pub const PANEL_SESSION_HEADER: &str = "X-Panel-Session";

/// The caller's panel session id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSession(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for PanelSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(PANEL_SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError::Validation("Missing X-Panel-Session header".to_string())
            })?;

        let session = Uuid::parse_str(header).map_err(|_| {
            ApiError::Validation("X-Panel-Session must be a UUID".to_string())
        })?;

        Ok(PanelSession(session))
    }
}
