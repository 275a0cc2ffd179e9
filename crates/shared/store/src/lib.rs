//! Document store contract.
//!
//! The repositories only talk to the store through the traits in
//! [`connection`]: bucket and collection resolution, per-document atomic
//! operations, and a query interface with eventual read consistency.
//!
//! [`MemoryStore`] is an in-process implementation of the same contract
//! used for development and tests.

pub mod connection;
pub mod deadline;
pub mod document;
pub mod error;
pub mod memory;
pub mod options;
pub mod query;

pub use connection::{Bucket, Cluster, Collection, StoreConnection};
pub use deadline::bounded;
pub use document::{GetResult, MutationResult};
pub use error::{StoreError, StoreResult};
pub use memory::{MemoryStore, StoreStats};
pub use options::{Cas, MutateInSpec, OperationOptions, QueryOptions};
pub use query::{
    query_all, Join, Keyspace, Predicate, Projection, QueryMetaData, QueryResult, QueryStatus, Select,
};

#[cfg(any(test, feature = "test-utils"))]
pub use connection::{MockBucket, MockCluster, MockCollection, MockStoreConnection};
