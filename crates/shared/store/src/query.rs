//! Typed query statements and query results.
//!
//! Statements are built as values so any backend can execute them; their
//! `Display` impl renders the equivalent N1QL text.

use std::fmt;
use std::time::Duration;

use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::connection::Cluster;
use crate::deadline::bounded;
use crate::error::{StoreError, StoreResult};
use crate::options::QueryOptions;

/// Fully qualified `bucket.scope.collection` address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Keyspace {
    pub bucket: String,
    pub scope: String,
    pub collection: String,
}

impl Keyspace {
    pub fn new(bucket: impl Into<String>, scope: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            scope: scope.into(),
            collection: collection.into(),
        }
    }
}

impl fmt::Display for Keyspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`.`{}`.`{}`", self.bucket, self.scope, self.collection)
    }
}

/// A column of the result row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Document key of `alias`, i.e. `META(alias).id`
    Key { alias: String, name: String },
    /// Body field of `alias`
    Field { alias: String, field: String, name: String },
}

impl Projection {
    /// `META(alias).id` exposed as `id`.
    pub fn key(alias: impl Into<String>) -> Self {
        Projection::Key {
            alias: alias.into(),
            name: "id".to_string(),
        }
    }

    /// `alias.field` exposed under its own name.
    pub fn field(alias: impl Into<String>, field: impl Into<String>) -> Self {
        let field = field.into();
        Projection::Field {
            alias: alias.into(),
            name: field.clone(),
            field,
        }
    }

    /// `alias.field AS name`.
    pub fn field_as(alias: impl Into<String>, field: impl Into<String>, name: impl Into<String>) -> Self {
        Projection::Field {
            alias: alias.into(),
            field: field.into(),
            name: name.into(),
        }
    }

    /// Name of the column in the result row.
    pub fn name(&self) -> &str {
        match self {
            Projection::Key { name, .. } | Projection::Field { name, .. } => name,
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Key { alias, name } if name == "id" => write!(f, "META({}).id", alias),
            Projection::Key { alias, name } => write!(f, "META({}).id AS {}", alias, name),
            Projection::Field { alias, field, name } if field == name => write!(f, "{}.{}", alias, field),
            Projection::Field { alias, field, name } => write!(f, "{}.{} AS {}", alias, field, name),
        }
    }
}

/// Row filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `alias.field IS MISSING`
    Missing { alias: String, field: String },
    /// `alias.field IS NOT MISSING`
    NotMissing { alias: String, field: String },
}

impl Predicate {
    pub fn missing(alias: impl Into<String>, field: impl Into<String>) -> Self {
        Predicate::Missing {
            alias: alias.into(),
            field: field.into(),
        }
    }

    pub fn not_missing(alias: impl Into<String>, field: impl Into<String>) -> Self {
        Predicate::NotMissing {
            alias: alias.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Missing { alias, field } => write!(f, "{}.{} IS MISSING", alias, field),
            Predicate::NotMissing { alias, field } => write!(f, "{}.{} IS NOT MISSING", alias, field),
        }
    }
}

/// Inner join of a second keyspace on its document key.
///
/// Renders as `INNER JOIN ks alias ON left.field = META(alias).id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub keyspace: Keyspace,
    pub alias: String,
    pub left_alias: String,
    pub left_field: String,
}

impl Join {
    pub fn on_key(
        keyspace: Keyspace,
        alias: impl Into<String>,
        left_alias: impl Into<String>,
        left_field: impl Into<String>,
    ) -> Self {
        Self {
            keyspace,
            alias: alias.into(),
            left_alias: left_alias.into(),
            left_field: left_field.into(),
        }
    }
}

/// `SELECT` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub from: Keyspace,
    pub alias: String,
    pub join: Option<Join>,
    pub projections: Vec<Projection>,
    pub predicates: Vec<Predicate>,
}

impl Select {
    pub fn from(keyspace: Keyspace, alias: impl Into<String>) -> Self {
        Self {
            from: keyspace,
            alias: alias.into(),
            join: None,
            projections: Vec::new(),
            predicates: Vec::new(),
        }
    }

    pub fn project(mut self, projection: Projection) -> Self {
        self.projections.push(projection);
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.join = Some(join);
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        if self.projections.is_empty() {
            write!(f, "{}.*", self.alias)?;
        }
        for (i, projection) in self.projections.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", projection)?;
        }

        write!(f, " FROM {} {}", self.from, self.alias)?;

        if let Some(join) = &self.join {
            write!(
                f,
                " INNER JOIN {} {} ON {}.{} = META({}).id",
                join.keyspace, join.alias, join.left_alias, join.left_field, join.alias
            )?;
        }

        for (i, predicate) in self.predicates.iter().enumerate() {
            let keyword = if i == 0 { "WHERE" } else { "AND" };
            write!(f, " {} {}", keyword, predicate)?;
        }

        Ok(())
    }
}

/// Completion status reported by the query service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Running,
    Success,
    Errors,
    Completed,
    Stopped,
    Timeout,
    Closed,
    Fatal,
    Aborted,
    Unknown,
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            QueryStatus::Running => "running",
            QueryStatus::Success => "success",
            QueryStatus::Errors => "errors",
            QueryStatus::Completed => "completed",
            QueryStatus::Stopped => "stopped",
            QueryStatus::Timeout => "timeout",
            QueryStatus::Closed => "closed",
            QueryStatus::Fatal => "fatal",
            QueryStatus::Aborted => "aborted",
            QueryStatus::Unknown => "unknown",
        };
        write!(f, "{}", status)
    }
}

/// Query metadata available before the rows are consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMetaData {
    pub request_id: String,
    pub status: QueryStatus,
    pub elapsed: Duration,
}

/// Query result: metadata plus a lazy row stream.
pub struct QueryResult {
    pub meta: QueryMetaData,
    rows: BoxStream<'static, StoreResult<Value>>,
}

impl QueryResult {
    pub fn new<S>(meta: QueryMetaData, rows: S) -> Self
    where
        S: Stream<Item = StoreResult<Value>> + Send + 'static,
    {
        Self {
            meta,
            rows: rows.boxed(),
        }
    }

    /// Result backed by rows already in memory.
    pub fn from_rows(meta: QueryMetaData, rows: Vec<Value>) -> Self {
        Self::new(meta, stream::iter(rows.into_iter().map(Ok)))
    }

    pub fn is_success(&self) -> bool {
        self.meta.status == QueryStatus::Success
    }

    /// Decode rows lazily as they arrive.
    pub fn rows_as<T>(self) -> BoxStream<'static, StoreResult<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.rows
            .map(|row| row.and_then(|value| serde_json::from_value::<T>(value).map_err(StoreError::from)))
            .boxed()
    }

    /// Drain the row stream into typed rows.
    pub async fn collect_rows<T>(self) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.rows_as::<T>().try_collect().await
    }
}

impl fmt::Debug for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryResult")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// Run a statement and materialize every row.
///
/// The options' budget covers both execution and row materialization. A
/// completion status other than success fails the call before any row is read.
pub async fn query_all<T>(cluster: &dyn Cluster, statement: &Select, options: QueryOptions) -> StoreResult<Vec<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    let timeout = options.timeout;
    let cancellation = options.cancellation.clone();

    bounded(timeout, cancellation.as_ref(), async {
        let result = cluster.query(statement, options).await?;
        if !result.is_success() {
            warn!(
                status = %result.meta.status,
                request_id = %result.meta.request_id,
                "Query did not complete successfully"
            );
            return Err(StoreError::QueryStatus(result.meta.status));
        }

        debug!(request_id = %result.meta.request_id, elapsed = ?result.meta.elapsed, "Query completed");
        result.collect_rows().await
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keyspace(collection: &str) -> Keyspace {
        Keyspace::new("Demo", "_default", collection)
    }

    #[test]
    fn test_render_filtered_select() {
        let select = Select::from(keyspace("wishlist"), "w")
            .project(Projection::key("w"))
            .project(Projection::field("w", "name"))
            .filter(Predicate::missing("w", "deleted"));

        assert_eq!(
            select.to_string(),
            "SELECT META(w).id, w.name FROM `Demo`.`_default`.`wishlist` w WHERE w.deleted IS MISSING"
        );
    }

    #[test]
    fn test_render_join() {
        let select = Select::from(keyspace("order"), "o")
            .project(Projection::key("o"))
            .project(Projection::field_as("c", "name", "customerName"))
            .join(Join::on_key(keyspace("customer"), "c", "o", "customerId"))
            .filter(Predicate::missing("o", "deleted"))
            .filter(Predicate::missing("c", "deleted"));

        assert_eq!(
            select.to_string(),
            "SELECT META(o).id, c.name AS customerName FROM `Demo`.`_default`.`order` o \
             INNER JOIN `Demo`.`_default`.`customer` c ON o.customerId = META(c).id \
             WHERE o.deleted IS MISSING AND c.deleted IS MISSING"
        );
    }

    #[test]
    fn test_render_without_projection() {
        let select = Select::from(keyspace("customer"), "c");
        assert_eq!(select.to_string(), "SELECT c.* FROM `Demo`.`_default`.`customer` c");
    }

    #[tokio::test]
    async fn test_collect_rows_decodes() {
        #[derive(serde::Deserialize)]
        struct Row {
            name: String,
        }

        let meta = QueryMetaData {
            request_id: "r1".to_string(),
            status: QueryStatus::Success,
            elapsed: Duration::ZERO,
        };
        let result = QueryResult::from_rows(meta, vec![json!({ "name": "a" }), json!({ "name": "b" })]);
        assert!(result.is_success());

        let rows: Vec<Row> = result.collect_rows().await.unwrap();
        let names: Vec<_> = rows.into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_collect_rows_reports_bad_row() {
        let meta = QueryMetaData {
            request_id: "r2".to_string(),
            status: QueryStatus::Success,
            elapsed: Duration::ZERO,
        };
        let result = QueryResult::from_rows(meta, vec![json!({ "unexpected": 1 })]);

        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Row {
            name: String,
        }
        let decoded = result.collect_rows::<Row>().await;
        assert!(matches!(decoded, Err(StoreError::Decoding(_))));
    }
}
