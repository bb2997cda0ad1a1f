//! The caller-facing error taxonomy.

use atlas_client::ClientError;
use atlas_store::StoreError;
use thiserror::Error;

/// Result type for engine operations.
pub type AtlasResult<T> = Result<T, AtlasError>;

/// The closed set of error kinds surfaced to callers of the engine.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// Neither the local store nor the remote catalog has the key.
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote catalog could not be reached or answered with a
    /// non-success status.
    #[error("remote source unavailable: {0}")]
    RemoteUnavailable(String),

    /// The remote catalog answered with an undecodable body.
    #[error("malformed remote response: {0}")]
    Malformed(String),

    /// A write violated referential integrity and the one documented
    /// repair retry did not resolve it.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// Local store failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<ClientError> for AtlasError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound(what) => Self::NotFound(what),
            ClientError::Malformed(detail) => Self::Malformed(detail),
            ClientError::Status { .. } | ClientError::Transport(_) => {
                Self::RemoteUnavailable(err.to_string())
            }
        }
    }
}

impl From<StoreError> for AtlasError {
    fn from(err: StoreError) -> Self {
        if err.is_constraint_violation() {
            Self::ConstraintViolation(err.to_string())
        } else if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else {
            Self::Storage(err.to_string())
        }
    }
}
