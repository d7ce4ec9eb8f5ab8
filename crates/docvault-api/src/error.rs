//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps custody and identity errors to HTTP status codes with a JSON body.
//! Internal error details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docvault_custody::CustodyError;
use docvault_identity::IdentityError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// No matching document or blob (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Input failed validation (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Body could not be parsed (422).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid credentials (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but acting for someone else (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Duplicate account or document (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Upload exceeds the configured body limit (413).
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// A backend is down or timed out (503). Retryable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Stored content failed verification (500).
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            Self::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            Self::Integrity(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTEGRITY_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::Integrity(_) => tracing::error!(error = %self, "stored content failed verification"),
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "backend unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<CustodyError> for AppError {
    fn from(err: CustodyError) -> Self {
        match err {
            CustodyError::Validation(msg) => Self::Validation(msg),
            CustodyError::Unauthorized(msg) => Self::Forbidden(msg),
            CustodyError::NotFound(msg) => Self::NotFound(msg),
            CustodyError::Conflict(msg) => Self::Conflict(msg),
            CustodyError::Corrupt { .. } => Self::Integrity(err.to_string()),
            CustodyError::StoreUnavailable { .. } | CustodyError::IndexUnavailable { .. } => {
                Self::ServiceUnavailable(err.to_string())
            }
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            IdentityError::Unauthorized(msg) => Self::Unauthorized(msg),
            IdentityError::DuplicateEmail => Self::Conflict(err.to_string()),
            IdentityError::Validation(msg) => Self::Validation(msg),
            IdentityError::DirectoryUnavailable(_) => Self::ServiceUnavailable(err.to_string()),
            IdentityError::TokenIssue(_) | IdentityError::Hashing(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<docvault_core::ValidationError> for AppError {
    fn from(err: docvault_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
