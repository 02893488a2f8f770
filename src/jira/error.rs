//! Tracker error types

use thiserror::Error;

/// Errors returned by the tracked-item store
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Issue not found: {key}")]
    NotFound { key: String },

    #[error("Permission denied for {key}")]
    PermissionDenied { key: String },

    #[error("Tracker API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrackerError {
    /// Map a non-success HTTP status to the matching error kind
    pub fn from_status(status: u16, key: &str, message: String) -> Self {
        match status {
            404 => TrackerError::NotFound { key: key.to_string() },
            401 | 403 => TrackerError::PermissionDenied { key: key.to_string() },
            _ => TrackerError::Api { status, message },
        }
    }
}
