//! Error types for the remote client.

use thiserror::Error;

/// Result type for remote client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur talking to the remote catalog.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The remote catalog has no record for the requested key.
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote answered with a non-success status.
    #[error("remote returned status {status}: {detail}")]
    Status { status: u16, detail: String },

    /// Transport-level failure (connect, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not decode into the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ClientError {
    /// Whether this error is a terminal not-found (as opposed to the remote
    /// being unreachable).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
