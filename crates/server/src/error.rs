//! HTTP error responses

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request input
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Malformed or oversized multipart body
    #[error(transparent)]
    Multipart(#[from] MultipartError),

    /// Anything that went wrong while processing
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Multipart(e) => e.status(),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match &self {
            ApiError::Multipart(e) => e.body_text(),
            other => other.to_string(),
        };
        if status.is_server_error() {
            tracing::error!(%status, error = %error, "Request failed");
        }
        (status, Json(ErrorBody { error })).into_response()
    }
}
