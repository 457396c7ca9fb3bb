//! Health check endpoint handler.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Base URL of the backend this panel talks to.
    pub backend: String,
    /// Number of live table sessions.
    pub active_sessions: usize,
}

/// Health check endpoint.
///
/// The panel holds no storage and probes nothing: it is healthy as long
/// as the process runs. Backend reachability surfaces on the table
/// routes themselves.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.config.backend.base_url.clone(),
        active_sessions: state.sessions.len(),
    })
}
