//! Client error types.

use shopfront_core::{BuilderError, EmailError};
use thiserror::Error;

use crate::storage::StorageError;

/// Errors returned by [`ApiClient`](crate::ApiClient) operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    /// No response was received.
    #[error("network error: {0}")]
    Network(String),

    /// Session storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A response did not have the expected shape.
    #[error("unexpected {what} payload: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The operation needs a stored credential.
    #[error("not signed in")]
    NotAuthenticated,

    /// The signed-in account may not perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A caller-supplied argument was rejected before any request.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Draft products failed validation.
    #[error(transparent)]
    Validation(#[from] BuilderError),

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Setup(#[from] reqwest::Error),
}

impl ClientError {
    /// HTTP status of the failure; `0` when no response was received and
    /// `None` when the failure happened before any request.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Network(_) => Some(0),
            _ => None,
        }
    }

    /// Whether the backend rejected the credential.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. } | Self::NotAuthenticated)
    }
}

impl From<EmailError> for ClientError {
    fn from(err: EmailError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result alias for client operations.
pub type Result<T, E = ClientError> = std::result::Result<T, E>;
