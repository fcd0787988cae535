// crates/server/src/error.rs
//! Mapping from the service error taxonomy to HTTP responses.
//!
//! Every error leaves the API as the uniform envelope with `success: false`
//! and a fixed status per variant: 404 not-found, 400 validation, 401
//! unauthorized, 409 conflict, 413 payload-too-large, 500 internal. Internal
//! detail is logged, never sent to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use atrium_core::{Envelope, ServiceError};

/// Route-layer error wrapper around [`ServiceError`].
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ServiceError::NotFound(what) => {
                tracing::warn!(what = %what, "resource not found");
                (StatusCode::NOT_FOUND, self.0.to_string())
            }
            ServiceError::Validation(detail) => {
                tracing::warn!(detail = %detail, "validation failed");
                (StatusCode::BAD_REQUEST, self.0.to_string())
            }
            ServiceError::Unauthorized(detail) => {
                tracing::warn!(detail = %detail, "unauthorized request");
                (StatusCode::UNAUTHORIZED, "unauthorized".to_string())
            }
            ServiceError::Conflict(detail) => {
                tracing::warn!(detail = %detail, "conflicting request");
                (StatusCode::CONFLICT, self.0.to_string())
            }
            ServiceError::PayloadTooLarge { size, limit } => {
                tracing::warn!(size, limit, "payload too large");
                (StatusCode::PAYLOAD_TOO_LARGE, self.0.to_string())
            }
            ServiceError::Internal(detail) => {
                tracing::error!(detail = %detail, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };

        (status, Json(Envelope::fail(message))).into_response()
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
