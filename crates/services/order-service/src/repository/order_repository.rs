//! Customer and order repository.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use common::{AppError, AppResult, StoreConfig};
use domain::{
    Customer, Order, OrderWithCustomer, SeedPair, COLLECTION_CUSTOMER, COLLECTION_ORDER, DEFAULT_SCOPE_NAME,
    FIELD_ADDRESS, FIELD_CUSTOMER_ID, FIELD_DELETED, FIELD_ITEMS, FIELD_NAME, FIELD_PRICE,
};
use store::{
    bounded, query_all, Collection, Join, Keyspace, OperationOptions, Predicate, Projection, QueryOptions, Select,
    StoreConnection,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const CUSTOMER_ALIAS: &str = "c";
const ORDER_ALIAS: &str = "o";

/// Order repository trait for dependency injection.
///
/// Listing methods exclude soft-deleted documents.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// List live customers
    async fn list_customers(&self, cancellation: &CancellationToken) -> AppResult<Vec<Customer>>;

    /// List live orders
    async fn list_orders(&self, cancellation: &CancellationToken) -> AppResult<Vec<Order>>;

    /// List live orders joined with their customer
    async fn list_orders_with_customers(&self, cancellation: &CancellationToken) -> AppResult<Vec<OrderWithCustomer>>;

    /// Insert `count` customer/order pairs numbered `start + 1 ..= start + count`.
    /// Returns the number of pairs written.
    async fn seed_data(&self, start: u64, count: u64, cancellation: &CancellationToken) -> AppResult<u64>;
}

/// Store-backed implementation of OrderRepository
pub struct OrderStore {
    connection: Arc<dyn StoreConnection>,
    config: StoreConfig,
}

impl OrderStore {
    /// Create new repository instance
    pub fn new(connection: Arc<dyn StoreConnection>, config: StoreConfig) -> Self {
        Self { connection, config }
    }

    fn keyspace(&self, collection: &str) -> Keyspace {
        Keyspace::new(self.config.bucket_name.as_str(), DEFAULT_SCOPE_NAME, collection)
    }

    async fn query<T>(&self, statement: Select, cancellation: &CancellationToken) -> AppResult<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        debug!(statement = %statement, "Running query");
        let options = QueryOptions::new()
            .timeout(self.config.query_timeout)
            .cancellation(cancellation)
            .read_only(true);

        let rows = bounded(Some(self.config.query_timeout), Some(cancellation), async {
            let bucket = self.connection.bucket(&self.config.bucket_name).await?;
            let cluster = bucket.cluster();
            query_all(cluster.as_ref(), &statement, options).await
        })
        .await?;

        Ok(rows)
    }

    async fn collections(&self, cancellation: &CancellationToken) -> AppResult<(Arc<dyn Collection>, Arc<dyn Collection>)> {
        let resolved = bounded(Some(self.config.kv_timeout), Some(cancellation), async {
            let bucket = self.connection.bucket(&self.config.bucket_name).await?;
            let customers = bucket.collection(COLLECTION_CUSTOMER).await?;
            let orders = bucket.collection(COLLECTION_ORDER).await?;
            Ok::<_, store::StoreError>((customers, orders))
        })
        .await?;

        Ok(resolved)
    }

    async fn insert(
        &self,
        collection: &dyn Collection,
        key: String,
        content: serde_json::Value,
        cancellation: &CancellationToken,
    ) -> AppResult<()> {
        let options = OperationOptions::new()
            .timeout(self.config.kv_timeout)
            .cancellation(cancellation);

        bounded(
            Some(self.config.kv_timeout),
            Some(cancellation),
            collection.insert(&key, content, options),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn list_customers(&self, cancellation: &CancellationToken) -> AppResult<Vec<Customer>> {
        let statement = Select::from(self.keyspace(COLLECTION_CUSTOMER), CUSTOMER_ALIAS)
            .project(Projection::key(CUSTOMER_ALIAS))
            .project(Projection::field(CUSTOMER_ALIAS, FIELD_NAME))
            .project(Projection::field(CUSTOMER_ALIAS, FIELD_ADDRESS))
            .filter(Predicate::missing(CUSTOMER_ALIAS, FIELD_DELETED));

        self.query(statement, cancellation).await
    }

    async fn list_orders(&self, cancellation: &CancellationToken) -> AppResult<Vec<Order>> {
        let statement = Select::from(self.keyspace(COLLECTION_ORDER), ORDER_ALIAS)
            .project(Projection::key(ORDER_ALIAS))
            .project(Projection::field(ORDER_ALIAS, FIELD_CUSTOMER_ID))
            .project(Projection::field(ORDER_ALIAS, FIELD_ITEMS))
            .project(Projection::field(ORDER_ALIAS, FIELD_PRICE))
            .filter(Predicate::missing(ORDER_ALIAS, FIELD_DELETED));

        self.query(statement, cancellation).await
    }

    async fn list_orders_with_customers(&self, cancellation: &CancellationToken) -> AppResult<Vec<OrderWithCustomer>> {
        let statement = Select::from(self.keyspace(COLLECTION_ORDER), ORDER_ALIAS)
            .project(Projection::key(ORDER_ALIAS))
            .project(Projection::field(ORDER_ALIAS, FIELD_ITEMS))
            .project(Projection::field(ORDER_ALIAS, FIELD_PRICE))
            .project(Projection::field_as(CUSTOMER_ALIAS, FIELD_NAME, "customerName"))
            .project(Projection::field_as(CUSTOMER_ALIAS, FIELD_ADDRESS, "customerAddress"))
            .join(Join::on_key(
                self.keyspace(COLLECTION_CUSTOMER),
                CUSTOMER_ALIAS,
                ORDER_ALIAS,
                FIELD_CUSTOMER_ID,
            ))
            .filter(Predicate::missing(ORDER_ALIAS, FIELD_DELETED))
            .filter(Predicate::missing(CUSTOMER_ALIAS, FIELD_DELETED));

        self.query(statement, cancellation).await
    }

    async fn seed_data(&self, start: u64, count: u64, cancellation: &CancellationToken) -> AppResult<u64> {
        let end = start
            .checked_add(count)
            .ok_or_else(|| AppError::validation("Seed range is too large"))?;
        if count == 0 {
            return Ok(0);
        }
        let (customers, orders) = self.collections(cancellation).await?;

        info!(start, count, "Seeding customers and orders");
        let mut written: u64 = 0;
        for n in (start + 1)..=end {
            let SeedPair { customer, order } = SeedPair::generate(n);

            let result = async {
                self.insert(customers.as_ref(), customer.id.to_string(), customer.body(), cancellation)
                    .await?;
                self.insert(orders.as_ref(), order.id.to_string(), order.body(), cancellation)
                    .await
            }
            .await;

            if let Err(e) = result {
                warn!(pair = n, written, error = %e, "Seeding aborted");
                return Err(e);
            }
            written += 1;
        }

        info!(written, "Seeding finished");
        Ok(written)
    }
}
