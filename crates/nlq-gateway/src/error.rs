//! Error handling for the gateway.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nlq_core::EngineError;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// The request was rejected before planning.
    #[error("{0}")]
    Validation(String),
    /// The question could not be planned.
    #[error("{0}")]
    Planning(String),
    /// A planned call failed.
    #[error("{0}")]
    Dispatch(String),
    /// Malformed request body.
    #[error("{0}")]
    BadRequest(String),
    /// Not found.
    #[error("{0}")]
    NotFound(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error flag.
    pub error: bool,
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Planning(_) => (StatusCode::BAD_REQUEST, "PLANNING_ERROR"),
            AppError::Dispatch(_) => (StatusCode::BAD_REQUEST, "DISPATCH_ERROR"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        warn!(code, error = %self, "Request rejected");

        let body = ErrorResponse {
            error: true,
            code: code.to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        let message = err.to_string();
        match err {
            EngineError::Validation(_) => AppError::Validation(message),
            EngineError::Planning(_) => AppError::Planning(message),
            EngineError::Dispatch(_) => AppError::Dispatch(message),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
