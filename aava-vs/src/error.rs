//! Error types for aava-vs

use aava_common::CodecError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Grid code could not be encoded or decoded (400)
    #[error("Grid code error: {0}")]
    Codec(#[from] CodecError),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::Codec(CodecError::InvalidLength { .. }) => (StatusCode::BAD_REQUEST, "INVALID_LENGTH"),
            ApiError::Codec(CodecError::InvalidSymbol(_)) => (StatusCode::BAD_REQUEST, "INVALID_SYMBOL"),
            ApiError::Codec(CodecError::OutOfBounds { .. }) => (StatusCode::BAD_REQUEST, "OUT_OF_BOUNDS"),
            ApiError::Codec(CodecError::InvalidBounds(_)) => (StatusCode::BAD_REQUEST, "INVALID_BOUNDS"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
