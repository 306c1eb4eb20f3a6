//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::config::AUTHENTICATE_MESSAGE;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Accounts
    #[error("User exists")]
    DuplicateUser,

    #[error("Wrong email")]
    UnknownUser,

    #[error("Incorrect password")]
    BadCredentials,

    // Authentication
    #[error("Authentication token missing")]
    MissingToken,

    #[error("Authentication token invalid")]
    InvalidToken,

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    // Validation
    #[error("{0}")]
    Validation(String),

    // External service errors
    #[error("Image upload failed: {0}")]
    UpstreamUploadFailure(String),

    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Token signing error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body, shaped like the `{success:false, errors}` replies
/// the storefront client already understands.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    errors: String,
    code: &'static str,
}

impl AppError {
    /// Get error code for client
    fn code(&self) -> &'static str {
        match self {
            AppError::DuplicateUser => "DUPLICATE_USER",
            AppError::UnknownUser => "UNKNOWN_USER",
            AppError::BadCredentials => "BAD_CREDENTIALS",
            // Missing and invalid tokens are indistinguishable to the client
            AppError::MissingToken | AppError::InvalidToken => "UNAUTHORIZED",
            AppError::NotFound => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::UpstreamUploadFailure(_) => "UPLOAD_FAILED",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Jwt(_) | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DuplicateUser => StatusCode::CONFLICT,
            AppError::UnknownUser
            | AppError::BadCredentials
            | AppError::MissingToken
            | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamUploadFailure(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Jwt(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),

            AppError::MissingToken | AppError::InvalidToken => {
                tracing::debug!("Rejected request: {}", self);
                AUTHENTICATE_MESSAGE.to_string()
            }

            // Hide details for internal/upstream errors
            AppError::UpstreamUploadFailure(reason) => {
                tracing::error!("Image upload failed: {}", reason);
                "Image upload failed".to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Jwt(e) => {
                tracing::error!("JWT error: {:?}", e);
                "An internal error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            success: false,
            errors: self.user_message(),
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        AppError::UpstreamUploadFailure(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
