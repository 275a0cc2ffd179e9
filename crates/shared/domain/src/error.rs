//! Domain-level errors.
//!
//! These errors represent document invariant violations.
//! They are independent of infrastructure concerns (HTTP, store transport).

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Domain-specific errors for document invariant violations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed for a field or input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Document carries a soft delete timestamp
    #[error("Document has been soft deleted on {0}")]
    SoftDeleted(DateTime<Utc>),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
