//! Classified error kinds.
//!
//! Every store failure is mapped onto one of a small set of kinds that the
//! caller can act on. Errors are never recovered from or retried here; they
//! travel up unchanged until the HTTP layer turns them into responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use domain::DomainError;
use serde::Serialize;
use store::StoreError;
use thiserror::Error;

/// Why a document was reported as not found.
///
/// Kept for logs only: all three causes surface as the same error kind and
/// the same client-facing message, so callers cannot tell "never existed"
/// from "was deleted". Exposing the reason would change observable behavior.
#[derive(Debug, Clone, PartialEq)]
pub enum NotFoundReason {
    /// Identifier was the nil/empty value
    InvalidId,
    /// No document under this key
    Missing(String),
    /// Document is a tombstone
    SoftDeleted(DateTime<Utc>),
}

impl std::fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotFoundReason::InvalidId => write!(f, "identifier is empty"),
            NotFoundReason::Missing(key) => write!(f, "document {} does not exist", key),
            NotFoundReason::SoftDeleted(at) => write!(f, "Document has been soft deleted on {}", at),
        }
    }
}

/// Application error kinds.
#[derive(Error, Debug)]
pub enum AppError {
    // Document lifecycle
    #[error("Resource not found: {0}")]
    NotFound(NotFoundReason),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("No changes detected")]
    NoChange,

    // Budget & cancellation
    #[error("Operation timed out")]
    Timeout,

    #[error("Operation cancelled")]
    Cancelled,

    // Store
    #[error("Store error: {0}")]
    Store(#[source] StoreError),

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body for HTTP
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Non-standard status used by proxies for requests abandoned by the client
const STATUS_CLIENT_CLOSED_REQUEST: u16 = 499;

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::NoChange => "NO_CHANGE",
            AppError::Timeout => "TIMEOUT",
            AppError::Cancelled => "CANCELLED",
            AppError::Store(_) => "STORE_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NoChange | AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Cancelled => StatusCode::from_u16(STATUS_CLIENT_CLOSED_REQUEST)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            AppError::Store(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // One message for every cause
            AppError::NotFound(reason) => {
                tracing::debug!("Not found: {}", reason);
                "Resource not found".to_string()
            }
            AppError::Conflict(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),

            // Hide details for store/internal errors
            AppError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                "A store error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Store & Domain Error Conversion
// =============================================================================

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DocumentNotFound(key) => AppError::NotFound(NotFoundReason::Missing(key)),
            StoreError::DocumentExists(key) => AppError::Conflict(format!("Document {} already exists", key)),
            StoreError::CasMismatch(key) => {
                AppError::Conflict(format!("Document {} was modified concurrently", key))
            }
            StoreError::Timeout(_) => AppError::Timeout,
            StoreError::Cancelled => AppError::Cancelled,
            other => AppError::Store(other),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::SoftDeleted(at) => AppError::NotFound(NotFoundReason::SoftDeleted(at)),
            DomainError::Validation(msg) => AppError::Validation(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, reason: NotFoundReason) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, reason: NotFoundReason) -> AppResult<T> {
        self.ok_or(AppError::NotFound(reason))
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
