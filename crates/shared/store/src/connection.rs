//! Store contract consumed by the repositories.
//!
//! Resolution is asynchronous and may be cached by the implementation; the
//! repositories never construct a connection themselves, they receive one.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::document::{GetResult, MutationResult};
use crate::error::StoreResult;
use crate::options::{MutateInSpec, OperationOptions, QueryOptions};
use crate::query::{QueryResult, Select};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Entry point: resolves buckets by name.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StoreConnection: Send + Sync {
    async fn bucket(&self, name: &str) -> StoreResult<Arc<dyn Bucket>>;
}

/// A bucket: owns collections and exposes the cluster's query service.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Bucket: Send + Sync {
    /// Resolve a collection in the default scope
    async fn collection(&self, name: &str) -> StoreResult<Arc<dyn Collection>>;

    /// Query service of the cluster hosting this bucket
    fn cluster(&self) -> Arc<dyn Cluster>;
}

/// Per-document atomic operations.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Collection: Send + Sync {
    /// Fetch a document and its current CAS
    async fn get(&self, key: &str, options: OperationOptions) -> StoreResult<GetResult>;

    /// Create a document, failing if the key already exists
    async fn insert(&self, key: &str, content: Value, options: OperationOptions) -> StoreResult<MutationResult>;

    /// Create or replace a document
    async fn upsert(&self, key: &str, content: Value, options: OperationOptions) -> StoreResult<MutationResult>;

    /// Remove a document; honours `options.cas` as a precondition
    async fn remove(&self, key: &str, options: OperationOptions) -> StoreResult<MutationResult>;

    /// Apply field-level mutations to an existing document
    async fn mutate_in(
        &self,
        key: &str,
        specs: Vec<MutateInSpec>,
        options: OperationOptions,
    ) -> StoreResult<MutationResult>;
}

/// Query service.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Cluster: Send + Sync {
    async fn query(&self, statement: &Select, options: QueryOptions) -> StoreResult<QueryResult>;
}
