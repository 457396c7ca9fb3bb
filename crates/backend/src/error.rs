//! Backend call error taxonomy.

use thiserror::Error;

/// Failure modes of a backend API call.
///
/// There is no retry or backoff here: a failed call is reported once and
/// retried only on explicit user action.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend request timed out")]
    Timeout,

    #[error("Backend transport error: {0}")]
    Transport(reqwest::Error),

    #[error("Resource not found")]
    NotFound,

    #[error("Backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Backend unavailable (status {status})")]
    Unavailable { status: u16 },

    #[error("Failed to decode backend response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err)
        }
    }
}

impl BackendError {
    /// Metric label for the call outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            BackendError::Timeout => "timeout",
            BackendError::Transport(_) => "transport",
            BackendError::NotFound => "not_found",
            BackendError::Rejected { .. } => "rejected",
            BackendError::Unavailable { .. } => "unavailable",
            BackendError::Decode(_) => "decode",
        }
    }
}
