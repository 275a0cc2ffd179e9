//! In-process document store.
//!
//! Implements the full store contract on top of hash maps: CAS tokens that
//! change on every mutation, insert conflicts, sub-document mutations and
//! typed query execution. Latency and query status can be injected to
//! exercise timeout and failure handling.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::connection::{Bucket, Cluster, Collection, StoreConnection};
use crate::deadline::bounded;
use crate::document::{GetResult, MutationResult};
use crate::error::{StoreError, StoreResult};
use crate::options::{Cas, MutateInSpec, OperationOptions, QueryOptions};
use crate::query::{Keyspace, Predicate, Projection, QueryMetaData, QueryResult, QueryStatus, Select};

/// Scope every in-memory collection lives in
const DEFAULT_SCOPE: &str = "_default";

#[derive(Debug, Clone)]
struct StoredDocument {
    cas: Cas,
    content: Value,
}

type Documents = HashMap<Keyspace, HashMap<String, StoredDocument>>;

/// Snapshot of operation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub gets: u64,
    pub inserts: u64,
    pub upserts: u64,
    pub removes: u64,
    pub mutations: u64,
    pub queries: u64,
}

impl StoreStats {
    /// Total number of round-trips
    pub fn total(&self) -> u64 {
        self.gets + self.inserts + self.upserts + self.removes + self.mutations + self.queries
    }

    /// Number of writes of any kind
    pub fn writes(&self) -> u64 {
        self.inserts + self.upserts + self.removes + self.mutations
    }
}

#[derive(Default)]
struct Counters {
    gets: AtomicU64,
    inserts: AtomicU64,
    upserts: AtomicU64,
    removes: AtomicU64,
    mutations: AtomicU64,
    queries: AtomicU64,
}

struct Inner {
    buckets: HashSet<String>,
    documents: RwLock<Documents>,
    next_cas: AtomicU64,
    latency_ms: AtomicU64,
    forced_status: RwLock<Option<QueryStatus>>,
    counters: Counters,
}

impl Inner {
    fn next_cas(&self) -> Cas {
        Cas(self.next_cas.fetch_add(1, Ordering::SeqCst))
    }

    async fn delay(&self) {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
    }

    fn check_cas(key: &str, current: Cas, expected: Option<Cas>) -> StoreResult<()> {
        match expected {
            Some(expected) if expected != current => Err(StoreError::CasMismatch(key.to_string())),
            _ => Ok(()),
        }
    }
}

/// In-process store. Cloning shares the underlying data.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Create a store exposing the given buckets.
    pub fn new<I, S>(buckets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: Arc::new(Inner {
                buckets: buckets.into_iter().map(Into::into).collect(),
                documents: RwLock::new(HashMap::new()),
                next_cas: AtomicU64::new(1),
                latency_ms: AtomicU64::new(0),
                forced_status: RwLock::new(None),
                counters: Counters::default(),
            }),
        }
    }

    /// Delay applied to every operation before it executes.
    pub fn set_latency(&self, latency: Duration) {
        self.inner
            .latency_ms
            .store(u64::try_from(latency.as_millis()).unwrap_or(u64::MAX), Ordering::SeqCst);
    }

    /// Make every query complete with `status` and no rows. `None` restores normal execution.
    pub async fn force_query_status(&self, status: Option<QueryStatus>) {
        *self.inner.forced_status.write().await = status;
    }

    /// Operation counters since creation.
    pub fn stats(&self) -> StoreStats {
        let c = &self.inner.counters;
        StoreStats {
            gets: c.gets.load(Ordering::SeqCst),
            inserts: c.inserts.load(Ordering::SeqCst),
            upserts: c.upserts.load(Ordering::SeqCst),
            removes: c.removes.load(Ordering::SeqCst),
            mutations: c.mutations.load(Ordering::SeqCst),
            queries: c.queries.load(Ordering::SeqCst),
        }
    }

    /// Write a document directly, bypassing latency and counters.
    pub async fn put(&self, bucket: &str, collection: &str, key: &str, content: Value) -> Cas {
        let cas = self.inner.next_cas();
        let keyspace = Keyspace::new(bucket, DEFAULT_SCOPE, collection);
        self.inner
            .documents
            .write()
            .await
            .entry(keyspace)
            .or_default()
            .insert(key.to_string(), StoredDocument { cas, content });
        cas
    }

    /// Read a document directly, bypassing latency and counters.
    pub async fn peek(&self, bucket: &str, collection: &str, key: &str) -> Option<Value> {
        let keyspace = Keyspace::new(bucket, DEFAULT_SCOPE, collection);
        self.inner
            .documents
            .read()
            .await
            .get(&keyspace)
            .and_then(|docs| docs.get(key))
            .map(|doc| doc.content.clone())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(["Demo"])
    }
}

#[async_trait]
impl StoreConnection for MemoryStore {
    async fn bucket(&self, name: &str) -> StoreResult<Arc<dyn Bucket>> {
        if !self.inner.buckets.contains(name) {
            return Err(StoreError::BucketNotFound(name.to_string()));
        }

        Ok(Arc::new(MemoryBucket {
            name: name.to_string(),
            inner: self.inner.clone(),
        }))
    }
}

struct MemoryBucket {
    name: String,
    inner: Arc<Inner>,
}

#[async_trait]
impl Bucket for MemoryBucket {
    async fn collection(&self, name: &str) -> StoreResult<Arc<dyn Collection>> {
        let keyspace = Keyspace::new(self.name.as_str(), DEFAULT_SCOPE, name);
        self.inner
            .documents
            .write()
            .await
            .entry(keyspace.clone())
            .or_default();

        Ok(Arc::new(MemoryCollection {
            keyspace,
            inner: self.inner.clone(),
        }))
    }

    fn cluster(&self) -> Arc<dyn Cluster> {
        Arc::new(MemoryCluster {
            inner: self.inner.clone(),
        })
    }
}

struct MemoryCollection {
    keyspace: Keyspace,
    inner: Arc<Inner>,
}

#[async_trait]
impl Collection for MemoryCollection {
    async fn get(&self, key: &str, options: OperationOptions) -> StoreResult<GetResult> {
        bounded(options.timeout, options.cancellation.as_ref(), async {
            self.inner.delay().await;
            self.inner.counters.gets.fetch_add(1, Ordering::SeqCst);
            debug!(keyspace = %self.keyspace, key, read_only = options.read_only, "get");

            let documents = self.inner.documents.read().await;
            let doc = documents
                .get(&self.keyspace)
                .and_then(|docs| docs.get(key))
                .ok_or_else(|| StoreError::DocumentNotFound(key.to_string()))?;

            Ok::<_, StoreError>(GetResult::new(key, doc.cas, doc.content.clone()))
        })
        .await
    }

    async fn insert(&self, key: &str, content: Value, options: OperationOptions) -> StoreResult<MutationResult> {
        bounded(options.timeout, options.cancellation.as_ref(), async {
            self.inner.delay().await;
            self.inner.counters.inserts.fetch_add(1, Ordering::SeqCst);
            debug!(keyspace = %self.keyspace, key, "insert");

            let mut documents = self.inner.documents.write().await;
            let docs = documents.entry(self.keyspace.clone()).or_default();
            if docs.contains_key(key) {
                return Err(StoreError::DocumentExists(key.to_string()));
            }

            let cas = self.inner.next_cas();
            docs.insert(key.to_string(), StoredDocument { cas, content });
            Ok(MutationResult { cas })
        })
        .await
    }

    async fn upsert(&self, key: &str, content: Value, options: OperationOptions) -> StoreResult<MutationResult> {
        bounded(options.timeout, options.cancellation.as_ref(), async {
            self.inner.delay().await;
            self.inner.counters.upserts.fetch_add(1, Ordering::SeqCst);
            debug!(keyspace = %self.keyspace, key, "upsert");

            let mut documents = self.inner.documents.write().await;
            let docs = documents.entry(self.keyspace.clone()).or_default();
            if let Some(expected) = options.cas {
                let current = docs
                    .get(key)
                    .ok_or_else(|| StoreError::DocumentNotFound(key.to_string()))?;
                Inner::check_cas(key, current.cas, Some(expected))?;
            }

            let cas = self.inner.next_cas();
            docs.insert(key.to_string(), StoredDocument { cas, content });
            Ok::<_, StoreError>(MutationResult { cas })
        })
        .await
    }

    async fn remove(&self, key: &str, options: OperationOptions) -> StoreResult<MutationResult> {
        bounded(options.timeout, options.cancellation.as_ref(), async {
            self.inner.delay().await;
            self.inner.counters.removes.fetch_add(1, Ordering::SeqCst);
            debug!(keyspace = %self.keyspace, key, cas = ?options.cas, "remove");

            let mut documents = self.inner.documents.write().await;
            let docs = documents.entry(self.keyspace.clone()).or_default();
            let current = docs
                .get(key)
                .ok_or_else(|| StoreError::DocumentNotFound(key.to_string()))?;
            Inner::check_cas(key, current.cas, options.cas)?;

            docs.remove(key);
            Ok::<_, StoreError>(MutationResult {
                cas: self.inner.next_cas(),
            })
        })
        .await
    }

    async fn mutate_in(
        &self,
        key: &str,
        specs: Vec<MutateInSpec>,
        options: OperationOptions,
    ) -> StoreResult<MutationResult> {
        bounded(options.timeout, options.cancellation.as_ref(), async {
            self.inner.delay().await;
            self.inner.counters.mutations.fetch_add(1, Ordering::SeqCst);
            debug!(keyspace = %self.keyspace, key, specs = specs.len(), "mutate_in");

            let mut documents = self.inner.documents.write().await;
            let docs = documents.entry(self.keyspace.clone()).or_default();
            let doc = docs
                .get_mut(key)
                .ok_or_else(|| StoreError::DocumentNotFound(key.to_string()))?;
            Inner::check_cas(key, doc.cas, options.cas)?;

            // All specs apply or none do.
            let mut content = doc.content.clone();
            let fields = content.as_object_mut().ok_or_else(|| StoreError::PathMismatch {
                key: key.to_string(),
                path: String::new(),
            })?;
            for spec in specs {
                match spec {
                    MutateInSpec::Upsert { path, value } => {
                        fields.insert(path, value);
                    }
                    MutateInSpec::Remove { path } => {
                        if fields.remove(&path).is_none() {
                            return Err(StoreError::PathMismatch {
                                key: key.to_string(),
                                path,
                            });
                        }
                    }
                }
            }

            doc.content = content;
            doc.cas = self.inner.next_cas();
            Ok(MutationResult { cas: doc.cas })
        })
        .await
    }
}

struct MemoryCluster {
    inner: Arc<Inner>,
}

impl MemoryCluster {
    fn matches(predicate: &Predicate, rows: &HashMap<&str, (&str, &Value)>) -> bool {
        let (alias, field, want_missing) = match predicate {
            Predicate::Missing { alias, field } => (alias, field, true),
            Predicate::NotMissing { alias, field } => (alias, field, false),
        };

        // Unknown alias: nothing bound, so every field is missing.
        let missing = rows
            .get(alias.as_str())
            .map_or(true, |(_, content)| content.get(field).is_none());

        missing == want_missing
    }

    fn project(select: &Select, rows: &HashMap<&str, (&str, &Value)>) -> Value {
        if select.projections.is_empty() {
            return rows
                .get(select.alias.as_str())
                .map(|(_, content)| (*content).clone())
                .unwrap_or(Value::Null);
        }

        let mut row = Map::new();
        for projection in &select.projections {
            let value = match projection {
                Projection::Key { alias, .. } => rows
                    .get(alias.as_str())
                    .map(|(key, _)| Value::String((*key).to_string())),
                Projection::Field { alias, field, .. } => rows
                    .get(alias.as_str())
                    .and_then(|(_, content)| content.get(field))
                    .cloned(),
            };
            // MISSING values are left out of the row.
            if let Some(value) = value {
                row.insert(projection.name().to_string(), value);
            }
        }
        Value::Object(row)
    }

    fn execute(select: &Select, documents: &Documents) -> Vec<Value> {
        let Some(left) = documents.get(&select.from) else {
            return Vec::new();
        };

        let mut results = Vec::new();
        for (key, doc) in left {
            let mut bound: HashMap<&str, (&str, &Value)> = HashMap::new();
            bound.insert(select.alias.as_str(), (key.as_str(), &doc.content));

            if let Some(join) = &select.join {
                let joined = doc
                    .content
                    .get(&join.left_field)
                    .and_then(Value::as_str)
                    .and_then(|target| {
                        documents
                            .get(&join.keyspace)
                            .and_then(|docs| docs.get_key_value(target))
                    });

                match joined {
                    Some((right_key, right)) => {
                        bound.insert(join.alias.as_str(), (right_key.as_str(), &right.content));
                    }
                    None => continue,
                }
            }

            if select.predicates.iter().all(|p| Self::matches(p, &bound)) {
                results.push(Self::project(select, &bound));
            }
        }
        results
    }
}

#[async_trait]
impl Cluster for MemoryCluster {
    async fn query(&self, statement: &Select, options: QueryOptions) -> StoreResult<QueryResult> {
        bounded(options.timeout, options.cancellation.as_ref(), async {
            self.inner.delay().await;
            self.inner.counters.queries.fetch_add(1, Ordering::SeqCst);
            debug!(%statement, read_only = options.read_only, "query");

            let started = Instant::now();
            let request_id = Uuid::new_v4().to_string();

            if let Some(status) = *self.inner.forced_status.read().await {
                if status != QueryStatus::Success {
                    let meta = QueryMetaData {
                        request_id,
                        status,
                        elapsed: started.elapsed(),
                    };
                    return Ok(QueryResult::from_rows(meta, Vec::new()));
                }
            }

            let rows = Self::execute(statement, &*self.inner.documents.read().await);
            let meta = QueryMetaData {
                request_id,
                status: QueryStatus::Success,
                elapsed: started.elapsed(),
            };
            Ok(QueryResult::from_rows(meta, rows))
        })
        .await
    }
}
