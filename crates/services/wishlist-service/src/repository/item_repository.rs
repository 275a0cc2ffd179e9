//! Wishlist item repository with soft delete support.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use common::{AppError, AppResult, NotFoundReason, StoreConfig};
use domain::{
    ensure_not_deleted, WishlistItem, WishlistItemDraft, COLLECTION_WISHLIST, DEFAULT_SCOPE_NAME, FIELD_DELETED,
    FIELD_NAME,
};
use store::{
    bounded, query_all, Collection, GetResult, Keyspace, MutateInSpec, OperationOptions, Predicate, Projection,
    QueryOptions, Select, StoreConnection, StoreResult,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const ALIAS: &str = "w";

/// Wishlist item repository trait for dependency injection.
///
/// By default, all read methods exclude soft-deleted items.
/// Use `*_with_deleted` variants to include them.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// List live items (excludes soft-deleted)
    async fn list(&self, cancellation: &CancellationToken) -> AppResult<Vec<WishlistItem>>;

    /// List every item including soft-deleted
    async fn list_with_deleted(&self, cancellation: &CancellationToken) -> AppResult<Vec<WishlistItem>>;

    /// Find a live item by ID
    async fn get_by_id(&self, id: Uuid, cancellation: &CancellationToken) -> AppResult<WishlistItem>;

    /// Find an item by ID including soft-deleted
    async fn get_by_id_with_deleted(&self, id: Uuid, cancellation: &CancellationToken) -> AppResult<WishlistItem>;

    /// Create a new item, or edit the one the draft addresses. Returns the item key.
    async fn create_or_edit(&self, draft: WishlistItemDraft, cancellation: &CancellationToken) -> AppResult<String>;

    /// Delete an item: `soft` stamps `deleted`, otherwise the document is removed
    async fn delete(&self, id: Uuid, soft: bool, cancellation: &CancellationToken) -> AppResult<()>;
}

/// Store-backed implementation of ItemRepository
pub struct ItemStore {
    connection: Arc<dyn StoreConnection>,
    config: StoreConfig,
}

impl ItemStore {
    /// Create new repository instance
    pub fn new(connection: Arc<dyn StoreConnection>, config: StoreConfig) -> Self {
        Self { connection, config }
    }

    fn keyspace(&self) -> Keyspace {
        Keyspace::new(self.config.bucket_name.as_str(), DEFAULT_SCOPE_NAME, COLLECTION_WISHLIST)
    }

    fn read_options(&self, cancellation: &CancellationToken) -> OperationOptions {
        OperationOptions::new()
            .timeout(self.config.kv_timeout)
            .cancellation(cancellation)
            .read_only(true)
    }

    fn write_options(&self, cancellation: &CancellationToken) -> OperationOptions {
        OperationOptions::new()
            .timeout(self.config.kv_timeout)
            .cancellation(cancellation)
    }

    /// Run a point call under the key-value budget.
    async fn point<T>(
        &self,
        cancellation: &CancellationToken,
        call: impl Future<Output = StoreResult<T>>,
    ) -> AppResult<T> {
        Ok(bounded(Some(self.config.kv_timeout), Some(cancellation), call).await?)
    }

    async fn collection(&self, cancellation: &CancellationToken) -> AppResult<Arc<dyn Collection>> {
        self.point(cancellation, async {
            let bucket = self.connection.bucket(&self.config.bucket_name).await?;
            bucket.collection(COLLECTION_WISHLIST).await
        })
        .await
    }

    /// Read-only fetch of the raw document, keeping its CAS.
    async fn fetch(
        &self,
        collection: &dyn Collection,
        key: &str,
        cancellation: &CancellationToken,
    ) -> AppResult<GetResult> {
        debug!(collection = COLLECTION_WISHLIST, key, "Fetching wishlist item");
        self.point(cancellation, collection.get(key, self.read_options(cancellation)))
            .await
    }

    /// Fetch and decode an item; the store key wins over any id in the body.
    async fn fetch_item(
        &self,
        collection: &dyn Collection,
        id: Uuid,
        cancellation: &CancellationToken,
    ) -> AppResult<(GetResult, WishlistItem)> {
        let fetched = self.fetch(collection, &id.to_string(), cancellation).await?;
        let item = fetched.content_as::<WishlistItem>()?.with_id(id);
        Ok((fetched, item))
    }

    async fn query_items(&self, statement: Select, cancellation: &CancellationToken) -> AppResult<Vec<WishlistItem>> {
        debug!(statement = %statement, "Querying wishlist items");
        let options = QueryOptions::new()
            .timeout(self.config.query_timeout)
            .cancellation(cancellation)
            .read_only(true);

        let items: Vec<WishlistItem> = bounded(Some(self.config.query_timeout), Some(cancellation), async {
            let bucket = self.connection.bucket(&self.config.bucket_name).await?;
            let cluster = bucket.cluster();
            query_all(cluster.as_ref(), &statement, options).await
        })
        .await?;

        debug!(count = items.len(), "Wishlist items loaded");
        Ok(items)
    }
}

/// Nil identifiers never reach the store.
fn require_id(id: Uuid) -> AppResult<Uuid> {
    if id.is_nil() {
        return Err(AppError::NotFound(NotFoundReason::InvalidId));
    }
    Ok(id)
}

#[async_trait]
impl ItemRepository for ItemStore {
    async fn list(&self, cancellation: &CancellationToken) -> AppResult<Vec<WishlistItem>> {
        let statement = Select::from(self.keyspace(), ALIAS)
            .project(Projection::key(ALIAS))
            .project(Projection::field(ALIAS, FIELD_NAME))
            .filter(Predicate::missing(ALIAS, FIELD_DELETED));

        self.query_items(statement, cancellation).await
    }

    async fn list_with_deleted(&self, cancellation: &CancellationToken) -> AppResult<Vec<WishlistItem>> {
        let statement = Select::from(self.keyspace(), ALIAS)
            .project(Projection::key(ALIAS))
            .project(Projection::field(ALIAS, FIELD_NAME))
            .project(Projection::field(ALIAS, FIELD_DELETED));

        self.query_items(statement, cancellation).await
    }

    async fn get_by_id(&self, id: Uuid, cancellation: &CancellationToken) -> AppResult<WishlistItem> {
        let id = require_id(id)?;
        let collection = self.collection(cancellation).await?;

        let (_, item) = self.fetch_item(collection.as_ref(), id, cancellation).await?;
        ensure_not_deleted(item.deleted)?;

        Ok(item)
    }

    async fn get_by_id_with_deleted(&self, id: Uuid, cancellation: &CancellationToken) -> AppResult<WishlistItem> {
        let id = require_id(id)?;
        let collection = self.collection(cancellation).await?;

        let (_, item) = self.fetch_item(collection.as_ref(), id, cancellation).await?;
        Ok(item)
    }

    async fn create_or_edit(&self, draft: WishlistItemDraft, cancellation: &CancellationToken) -> AppResult<String> {
        let collection = self.collection(cancellation).await?;

        let (key, document) = match draft.key().map(str::to_owned) {
            Some(key) => {
                // Only editable while live
                let fetched = self.fetch(collection.as_ref(), &key, cancellation).await?;
                let stored: WishlistItemDraft = fetched.content_as()?;
                ensure_not_deleted(stored.deleted)?;

                let merged = stored.with_id(draft.id.clone());
                if merged == draft {
                    debug!(key = %key, "Draft matches stored item, nothing to write");
                    return Err(AppError::NoChange);
                }

                // The stored fields are written back, not the draft's.
                (key, merged)
            }
            None => {
                let key = Uuid::new_v4().to_string();
                let document = draft.with_id(Some(key.clone()));
                (key, document)
            }
        };

        self.point(
            cancellation,
            collection.upsert(&key, document.body(), self.write_options(cancellation)),
        )
        .await?;

        info!(key = %key, "Wishlist item saved");
        Ok(key)
    }

    async fn delete(&self, id: Uuid, soft: bool, cancellation: &CancellationToken) -> AppResult<()> {
        let id = require_id(id)?;
        let key = id.to_string();
        let collection = self.collection(cancellation).await?;

        // Both modes start from a fresh fetch; the CAS is only used by removal.
        let (fetched, item) = self.fetch_item(collection.as_ref(), id, cancellation).await?;

        if soft {
            ensure_not_deleted(item.deleted)?;
            let deleted_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
            let specs = vec![MutateInSpec::upsert(FIELD_DELETED, deleted_at)];

            self.point(
                cancellation,
                collection.mutate_in(&key, specs, self.write_options(cancellation)),
            )
            .await?;
            info!(key = %key, "Wishlist item soft deleted");
        } else {
            let options = self.write_options(cancellation).cas(fetched.cas);

            self.point(cancellation, collection.remove(&key, options)).await?;
            info!(key = %key, cas = %fetched.cas, "Wishlist item removed");
        }

        Ok(())
    }
}
