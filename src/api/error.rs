//! Error type shared by every BadAPI request.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use crate::store::CredentialKind;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, TLS, connection reset...).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response. `message` is the server's `detail` text when present,
    /// otherwise the HTTP status phrase.
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        payload: Value,
    },

    /// A bearer credential required by the endpoint group is not stored.
    #[error("No {0} stored. {hint}", hint = .0.hint())]
    MissingCredential(CredentialKind),

    /// Rejected locally before any request was sent.
    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid header {0}")]
    InvalidHeader(String),

    #[error("Failed to encode request body: {0}")]
    Encode(serde_json::Error),

    /// A 2xx payload did not have the shape the endpoint binding expects.
    #[error("Unexpected response from server: {0}")]
    Decode(serde_json::Error),

    #[error("Failed to read {}: {source}", .path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ApiError {
    /// HTTP status code for `Status` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Full parsed error payload for `Status` errors.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            ApiError::Status { payload, .. } => Some(payload),
            _ => None,
        }
    }
}
