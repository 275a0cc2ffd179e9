//! Store-level errors.
//!
//! These describe what the store reported. Classification into the
//! application's error kinds happens one layer up.

use std::time::Duration;

use thiserror::Error;

use crate::query::QueryStatus;

/// Errors reported by a document store implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document {0} not found")]
    DocumentNotFound(String),

    #[error("Document {0} already exists")]
    DocumentExists(String),

    /// CAS precondition did not match the current document revision
    #[error("CAS mismatch on document {0}")]
    CasMismatch(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Bucket {0} not found")]
    BucketNotFound(String),

    #[error("Collection {0} not found")]
    CollectionNotFound(String),

    /// Query finished with a status other than success
    #[error("Query execution error: status {0}")]
    QueryStatus(QueryStatus),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Path {path} cannot be mutated in document {key}")]
    PathMismatch { key: String, path: String },

    #[error("Document decoding failed: {0}")]
    Decoding(#[from] serde_json::Error),
}

impl StoreError {
    /// True for failures caused by the caller's time budget or cancellation.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, StoreError::Timeout(_) | StoreError::Cancelled)
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
