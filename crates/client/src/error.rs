//! Client-side error model.

use thiserror::Error;

use crate::storage::StorageError;

/// Result type returned by every client operation.
pub type ClientResult<T> = Result<T, ClientError>;

/// Everything a client call can fail with.
///
/// Backend failures are carried verbatim (`status` + body text) so callers can
/// show the backend's own message.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (DNS, connection refused, TLS...).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The backend answered 401 (expired session or bad credentials). The
    /// session has already been cleared and a login navigation requested by
    /// the time this is returned.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Token renewal was attempted without a refresh token.
    #[error("no refresh token available")]
    NoRefreshToken,

    /// The response body was not the JSON shape we expected.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// HTTP status of the failure, when the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Unauthorized(_) => Some(401),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }
}
