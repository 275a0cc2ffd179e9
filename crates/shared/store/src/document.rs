//! Results of point operations.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::StoreResult;
use crate::options::Cas;

/// Document fetched by key.
#[derive(Debug, Clone, PartialEq)]
pub struct GetResult {
    pub key: String,
    pub cas: Cas,
    pub content: Value,
}

impl GetResult {
    pub fn new(key: impl Into<String>, cas: Cas, content: Value) -> Self {
        Self {
            key: key.into(),
            cas,
            content,
        }
    }

    /// Decode the body into a typed document.
    pub fn content_as<T: DeserializeOwned>(&self) -> StoreResult<T> {
        Ok(T::deserialize(&self.content)?)
    }
}

/// Outcome of a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationResult {
    /// Revision of the document after the write
    pub cas: Cas,
}
