//! API error types and JSON error response formatting.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use freddo_chat::ChatError;
use freddo_core::error::FreddoError;
use freddo_storage::StorageError;

/// Message returned when `/chat` is called without a usable message.
pub const NO_MESSAGE: &str = "No message provided";

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    /// `"error"` on server failures, absent on client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid input.
    BadRequest(String),
    /// 404 Not Found - resource does not exist.
    NotFound(String),
    /// 500 Internal Server Error - unexpected server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, status_field) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, Some("error")),
        };

        let body = ErrorBody {
            error,
            status: status_field,
        };
        (status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage => ApiError::BadRequest(NO_MESSAGE.to_string()),
            ChatError::MessageTooLong(_) | ChatError::InvalidRole(_) => {
                ApiError::BadRequest(err.to_string())
            }
            ChatError::SessionNotFound(_) => ApiError::NotFound(err.to_string()),
            ChatError::AgentUnavailable(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StorageError::InvalidName(_) => ApiError::BadRequest(err.to_string()),
            StorageError::Io(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<FreddoError> for ApiError {
    fn from(err: FreddoError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
