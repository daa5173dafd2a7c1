//! API error type.
//!
//! Maps engine errors and extractor rejections to structured JSON error
//! bodies. Internal error details are logged but never returned to clients.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::error::KycError;

/// Message returned in place of internal error details.
const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error detail.
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. `NOT_FOUND`, `VALIDATION_ERROR`).
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Error returned by every API handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Input failed validation (400).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body, path or query could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Requested resource does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Anything else (500). The message is logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status code and machine-readable error code.
    const fn status_and_code(&self) -> (StatusCode, &'static str) {
        match *self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    #[inline]
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = if let Self::Internal(ref detail) = self {
            tracing::error!(error = %detail, "internal server error");
            INTERNAL_MESSAGE.to_owned()
        } else {
            self.to_string()
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_owned(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<KycError> for ApiError {
    #[inline]
    fn from(err: KycError) -> Self {
        match err {
            KycError::Validation(msg) => Self::Validation(msg),
            KycError::NotFound(msg) => Self::NotFound(msg),
            other @ (KycError::Storage(_)
            | KycError::Serialization(_)
            | KycError::Http(_)
            | KycError::Directory { .. }
            | KycError::Config(_)
            | KycError::Io(_)) => Self::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    #[inline]
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    #[inline]
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    #[inline]
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
