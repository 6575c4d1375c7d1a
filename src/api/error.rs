//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::health::HealthError;
use crate::journal::PersistenceError;
use crate::mirror::MirrorError;
use crate::services::ServiceError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A required upload, selection or text is missing
    #[error("{0}")]
    InputMissing(String),

    /// Health data could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] HealthError),

    /// Text or speech service failed
    #[error("External service error: {0}")]
    Service(#[from] ServiceError),

    /// Journal history could not be persisted
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MirrorError> for ApiError {
    fn from(e: MirrorError) -> Self {
        match e {
            MirrorError::InputMissing(message) => ApiError::InputMissing(message),
            MirrorError::NotFound(message) => ApiError::NotFound(message),
            MirrorError::Parse(e) => ApiError::Parse(e),
            MirrorError::Service(e) => ApiError::Service(e),
            MirrorError::Persistence(e) => ApiError::Persistence(e),
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::InputMissing(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INPUT_MISSING"),
            ApiError::Parse(_) => (StatusCode::BAD_REQUEST, "PARSE_ERROR"),
            ApiError::Service(ServiceError::MissingCredential(_)) => {
                (StatusCode::BAD_GATEWAY, "MISSING_CREDENTIAL")
            }
            ApiError::Service(ServiceError::Timeout) => (StatusCode::BAD_GATEWAY, "SERVICE_TIMEOUT"),
            ApiError::Service(_) => (StatusCode::BAD_GATEWAY, "EXTERNAL_SERVICE_ERROR"),
            ApiError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        // Missing input is a user-facing warning, not a server fault
        if status.is_client_error() {
            tracing::warn!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API request rejected"
            );
        } else {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_errors_map_to_status() {
        let cases = [
            (
                ApiError::from(MirrorError::InputMissing("upload first".into())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::from(MirrorError::NotFound("No message at position 9.".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(MirrorError::Parse(HealthError::Parse("bad".into()))),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(MirrorError::Service(ServiceError::Unavailable)),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::from(MirrorError::Persistence(PersistenceError::Io(
                    std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                ))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_and_code().0, expected);
        }
    }

    #[test]
    fn test_input_missing_keeps_message() {
        let err = ApiError::from(MirrorError::InputMissing("Please upload".into()));
        assert_eq!(err.to_string(), "Please upload");
        assert_eq!(err.status_and_code().1, "INPUT_MISSING");
    }
}
