//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every error response is a JSON object:
//!
//! ```json
//! {"error": "Validation failed", "fields": {"email": ["Invalid email format"]}}
//! ```
//!
//! `fields` is only present for validation failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use online_shopping_core::ValidationErrors;

use crate::db::RepositoryError;
use crate::db::orders::OrderError;
use crate::services::password::PasswordHashError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// One or more request fields were rejected.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The HTTP status this error responds with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("Resource not found".to_string()),
            RepositoryError::Conflict(message) => Self::BadRequest(message),
            other => Self::Database(other),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::CustomerNotFound(_) | OrderError::ProductNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            OrderError::NotCancelable(_) => Self::BadRequest(err.to_string()),
            OrderError::Repository(RepositoryError::NotFound) => {
                Self::NotFound("Order not found".to_string())
            }
            OrderError::Repository(e) => e.into(),
        }
    }
}

impl From<PasswordHashError> for AppError {
    fn from(err: PasswordHashError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// JSON body of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a ValidationErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let body = match &self {
            Self::Database(_) | Self::Internal(_) => ErrorBody {
                error: "Internal server error".to_string(),
                fields: None,
            },
            Self::Validation(errors) => ErrorBody {
                error: "Validation failed".to_string(),
                fields: Some(errors),
            },
            Self::NotFound(message) | Self::BadRequest(message) => ErrorBody {
                error: message.clone(),
                fields: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
