//! Per-operation options.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Opaque revision token of a document.
///
/// Every mutation yields a new token; passing one back as a precondition
/// makes the write fail if the document changed in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cas(pub u64);

impl fmt::Display for Cas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Options for point operations.
#[derive(Debug, Clone, Default)]
pub struct OperationOptions {
    /// Wall-clock budget of the operation
    pub timeout: Option<Duration>,
    /// Cooperative cancellation signal
    pub cancellation: Option<CancellationToken>,
    /// The caller will not mutate anything with this call
    pub read_only: bool,
    /// Revision precondition
    pub cas: Option<Cas>,
}

impl OperationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cancellation(mut self, token: &CancellationToken) -> Self {
        self.cancellation = Some(token.clone());
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn cas(mut self, cas: Cas) -> Self {
        self.cas = Some(cas);
        self
    }
}

/// Options for queries.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub timeout: Option<Duration>,
    pub cancellation: Option<CancellationToken>,
    /// Allows the store to route the query to replicas
    pub read_only: bool,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cancellation(mut self, token: &CancellationToken) -> Self {
        self.cancellation = Some(token.clone());
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

/// A single sub-document mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum MutateInSpec {
    /// Create or replace a top-level field
    Upsert { path: String, value: Value },
    /// Remove a top-level field
    Remove { path: String },
}

impl MutateInSpec {
    pub fn upsert(path: impl Into<String>, value: impl Into<Value>) -> Self {
        MutateInSpec::Upsert {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        MutateInSpec::Remove { path: path.into() }
    }

    pub fn path(&self) -> &str {
        match self {
            MutateInSpec::Upsert { path, .. } | MutateInSpec::Remove { path } => path,
        }
    }
}
