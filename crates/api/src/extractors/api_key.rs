//! Panel API key authentication extractor.
//!
//! Validates the `X-API-Key` header against the SHA-256 hashes listed in
//! configuration. The panel owns no storage, so there is no database
//! lookup and no last-used bookkeeping; key rotation is a config change.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::app::AppState;
use crate::config::SecurityConfig;
use crate::error::ApiError;
use shared::crypto::{extract_key_prefix, sha256_hex};

/// Authenticated panel key information.
#[derive(Debug, Clone)]
pub struct ApiKeyAuth {
    /// Key prefix for identification (e.g., "ep_aBcDe").
    pub key_prefix: String,
}

impl ApiKeyAuth {
    /// Validates a panel key against the configured hashes.
    pub fn validate(security: &SecurityConfig, api_key: &str) -> Result<Self, ApiError> {
        // Minimum shape: ep_ prefix + 8 characters.
        let prefix = extract_key_prefix(api_key)
            .ok_or_else(|| ApiError::Unauthorized("Invalid or missing API key".to_string()))?;

        let key_hash = sha256_hex(api_key);
        if !security.api_key_hashes.iter().any(|h| *h == key_hash) {
            return Err(ApiError::Unauthorized(
                "Invalid or missing API key".to_string(),
            ));
        }

        Ok(ApiKeyAuth {
            key_prefix: format!("ep_{}", prefix),
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for ApiKeyAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let api_key = parts
            .headers
            .get("X-API-Key")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Invalid or missing API key".to_string()))?;

        Self::validate(&state.config.security, api_key)
    }
}
