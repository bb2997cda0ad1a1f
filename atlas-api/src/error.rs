//! Error-to-response mapping.

use atlas_repo::AtlasError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Errors a handler can answer with.
#[derive(Debug)]
pub enum ApiError {
    /// Invalid path or query parameter.
    BadRequest(String),
    /// Engine failure, mapped onto a status by kind.
    Engine(AtlasError),
}

impl From<AtlasError> for ApiError {
    fn from(err: AtlasError) -> Self {
        Self::Engine(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Engine(err) => {
                let status = match &err {
                    AtlasError::NotFound(_) => StatusCode::NOT_FOUND,
                    AtlasError::RemoteUnavailable(_) | AtlasError::Malformed(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                    AtlasError::ConstraintViolation(_) | AtlasError::Storage(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, err.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
