//! SSO error types.
//!
//! Only the ingestion and hook endpoints surface these to callers. The
//! responder legs turn every failure into a redirect instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// SSO errors.
#[derive(Debug, Error)]
pub enum SsoError {
    #[error("SSO is not enabled on this site")]
    Disabled,

    #[error("Invalid handshake payload: {reason}")]
    InvalidPayload { reason: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Missing or invalid hook token")]
    Unauthorized,

    #[error("User not found")]
    UserNotFound,

    #[error("Local authority error: {message}")]
    AuthorityError { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error response structure for API responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl SsoError {
    /// Get the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            SsoError::Disabled => "sso_disabled",
            SsoError::InvalidPayload { .. } => "invalid_payload",
            SsoError::InvalidRequest { .. } => "invalid_request",
            SsoError::Unauthorized => "unauthorized",
            SsoError::UserNotFound => "user_not_found",
            SsoError::AuthorityError { .. } => "authority_error",
            SsoError::ConfigurationError { .. } => "configuration_error",
            SsoError::DatabaseError(_) => "database_error",
            SsoError::HttpError(_) => "http_error",
            SsoError::InternalError { .. } => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            SsoError::Disabled | SsoError::UserNotFound => StatusCode::NOT_FOUND,
            SsoError::InvalidPayload { .. } | SsoError::InvalidRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            SsoError::Unauthorized => StatusCode::UNAUTHORIZED,
            SsoError::HttpError(_) => StatusCode::BAD_GATEWAY,
            SsoError::AuthorityError { .. }
            | SsoError::ConfigurationError { .. }
            | SsoError::DatabaseError(_)
            | SsoError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sitebridge_db::DbError> for SsoError {
    fn from(err: sitebridge_db::DbError) -> Self {
        SsoError::InternalError {
            message: err.to_string(),
        }
    }
}

impl IntoResponse for SsoError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            SsoError::DatabaseError(e) => {
                tracing::error!("SSO database error: {:?}", e);
                "A database error occurred".to_string()
            }
            SsoError::HttpError(e) => {
                tracing::error!("SSO HTTP error: {:?}", e);
                "An HTTP client error occurred".to_string()
            }
            SsoError::AuthorityError { message } => {
                tracing::error!("SSO local authority error: {}", message);
                "An internal error occurred".to_string()
            }
            SsoError::ConfigurationError { message } => {
                tracing::error!("SSO configuration error: {}", message);
                "A configuration error occurred".to_string()
            }
            SsoError::InternalError { message } => {
                tracing::error!("SSO internal error: {}", message);
                "An internal error occurred".to_string()
            }
            // Payload problems are never echoed; they may carry attacker-controlled text.
            SsoError::InvalidPayload { reason } => {
                tracing::warn!(reason = %reason, "Rejected handshake payload");
                "Invalid handshake payload".to_string()
            }
            _ => self.to_string(),
        };
        let body = ErrorResponse {
            error: self.error_code().to_string(),
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Result type alias for SSO operations.
pub type SsoResult<T> = Result<T, SsoError>;
