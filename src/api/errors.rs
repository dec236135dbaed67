//! API error types and HTTP status mapping.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::scheduler::SchedulerError;
use crate::storage::StorageError;

use super::responses::ScheduleResponse;

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// API error type that can be converted to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request body or identifier.
    BadRequest(String),
    /// Resource not found.
    NotFound(String),
    /// Admission refused (capacity exceeded or shutting down).
    Rejected(String),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Rejected(msg) => {
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ScheduleResponse::rejected(msg)),
                )
                    .into_response();
            }
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<SchedulerError> for ApiError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::ShuttingDown => ApiError::Rejected(err.to_string()),
            SchedulerError::InvalidId(e) => ApiError::BadRequest(e.to_string()),
            SchedulerError::Storage(e) => e.into(),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StorageError::CapacityExceeded { .. } | StorageError::QueueUnavailable(_) => {
                ApiError::Rejected(err.to_string())
            }
            StorageError::LockPoisoned => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("invalid request body: {}", rejection.body_text()))
    }
}
