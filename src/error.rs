//! Error types for the catalog API
//!
//! Errors that reach HTTP callers. Cache faults are not among them: they are
//! absorbed by the cache layer (see [`crate::cache::CacheClientError`]).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

// == App Error Enum ==
/// Unified error type for request handling.
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad input from the caller
    #[error("{0}")]
    Validation(String),

    /// The source of record has no matching row
    #[error("{0}")]
    NotFound(String),

    /// The source of record failed
    #[error("Database error: {0}")]
    SourceOfRecord(#[from] sqlx::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::SourceOfRecord(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SourceOfRecord(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Database details stay in the log
        let message = match &self {
            AppError::SourceOfRecord(e) => {
                error!(error = %e, "source of record query failed");
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                error!(error = %msg, "internal error");
                self.to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse::new(message, self.code()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for request handling.
pub type Result<T> = std::result::Result<T, AppError>;
