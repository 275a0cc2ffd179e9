//! Order repository behavior against the in-memory store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use common::{AppError, StoreConfig};
use domain::{COLLECTION_CUSTOMER, COLLECTION_ORDER, DEFAULT_BUCKET_NAME};
use order_service_lib::{OrderRepository, OrderStore};
use store::{MemoryStore, QueryStatus, StoreError};

fn setup() -> (MemoryStore, OrderStore) {
    let store = MemoryStore::default();
    let repo = OrderStore::new(Arc::new(store.clone()), StoreConfig::default());
    (store, repo)
}

#[tokio::test]
async fn test_customers_scenario() {
    let (store, repo) = setup();
    let mut expected = HashMap::new();
    for i in 1..=4 {
        let id = Uuid::new_v4();
        store
            .put(
                DEFAULT_BUCKET_NAME,
                COLLECTION_CUSTOMER,
                &id.to_string(),
                json!({ "name": format!("Customer_{}", i), "address": format!("Address_{}", i) }),
            )
            .await;
        expected.insert(id, i);
    }

    let customers = repo.list_customers(&CancellationToken::new()).await.unwrap();

    assert_eq!(customers.len(), 4);
    for customer in customers {
        let i = expected[&customer.id];
        assert_eq!(customer.name, format!("Customer_{}", i));
        assert_eq!(customer.address, format!("Address_{}", i));
    }
}

#[tokio::test]
async fn test_lists_skip_soft_deleted() {
    let (store, repo) = setup();
    let live = Uuid::new_v4();
    store
        .put(DEFAULT_BUCKET_NAME, COLLECTION_CUSTOMER, &live.to_string(), json!({ "name": "A", "address": "X" }))
        .await;
    store
        .put(
            DEFAULT_BUCKET_NAME,
            COLLECTION_CUSTOMER,
            &Uuid::new_v4().to_string(),
            json!({ "name": "B", "address": "Y", "deleted": "2024-03-01T12:00:00Z" }),
        )
        .await;

    let customers = repo.list_customers(&CancellationToken::new()).await.unwrap();

    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].id, live);
}

#[tokio::test]
async fn test_seed_then_join() {
    let (store, repo) = setup();
    let token = CancellationToken::new();

    let written = repo.seed_data(10, 3, &token).await.unwrap();
    assert_eq!(written, 3);
    assert_eq!(store.stats().inserts, 6);

    let customers = repo.list_customers(&token).await.unwrap();
    let orders = repo.list_orders(&token).await.unwrap();
    assert_eq!(customers.len(), 3);
    assert_eq!(orders.len(), 3);

    let mut joined = repo.list_orders_with_customers(&token).await.unwrap();
    joined.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap());
    let summary: Vec<_> = joined
        .iter()
        .map(|row| (row.items.as_str(), row.price, row.customer_name.as_str(), row.customer_address.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Items_11", 11.0, "Customer_11", "Address_11"),
            ("Items_12", 12.0, "Customer_12", "Address_12"),
            ("Items_13", 13.0, "Customer_13", "Address_13"),
        ]
    );

    for order in orders {
        assert!(customers.iter().any(|c| c.id == order.customer_id));
    }
}

#[tokio::test]
async fn test_join_drops_orphan_orders() {
    let (store, repo) = setup();
    store
        .put(
            DEFAULT_BUCKET_NAME,
            COLLECTION_ORDER,
            &Uuid::new_v4().to_string(),
            json!({ "customerId": Uuid::new_v4(), "items": "Items_1", "price": 1.0 }),
        )
        .await;

    let token = CancellationToken::new();
    assert_eq!(repo.list_orders(&token).await.unwrap().len(), 1);
    assert!(repo.list_orders_with_customers(&token).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_join_hides_orders_of_soft_deleted_customer() {
    let (store, repo) = setup();
    let customer = Uuid::new_v4();
    store
        .put(
            DEFAULT_BUCKET_NAME,
            COLLECTION_CUSTOMER,
            &customer.to_string(),
            json!({ "name": "Customer_1", "address": "Address_1", "deleted": "2024-03-01T12:00:00Z" }),
        )
        .await;
    store
        .put(
            DEFAULT_BUCKET_NAME,
            COLLECTION_ORDER,
            &Uuid::new_v4().to_string(),
            json!({ "customerId": customer, "items": "Items_1", "price": 1.0 }),
        )
        .await;

    let token = CancellationToken::new();
    assert_eq!(repo.list_orders(&token).await.unwrap().len(), 1);
    assert!(repo.list_orders_with_customers(&token).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_seed_zero_writes_nothing() {
    let (store, repo) = setup();

    let written = repo.seed_data(0, 0, &CancellationToken::new()).await.unwrap();

    assert_eq!(written, 0);
    assert_eq!(store.stats().total(), 0);
}

#[tokio::test]
async fn test_failed_query_status() {
    let (store, repo) = setup();
    repo.seed_data(0, 2, &CancellationToken::new()).await.unwrap();
    store.force_query_status(Some(QueryStatus::Timeout)).await;

    let result = repo.list_orders(&CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(AppError::Store(StoreError::QueryStatus(QueryStatus::Timeout)))
    ));
}

#[tokio::test]
async fn test_cancelled_seed_writes_nothing() {
    let (store, repo) = setup();
    let token = CancellationToken::new();
    token.cancel();

    let result = repo.seed_data(0, 5, &token).await;

    assert!(matches!(result, Err(AppError::Cancelled)));
    assert_eq!(store.stats().inserts, 0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_query_times_out() {
    let store = MemoryStore::default();
    store.set_latency(Duration::from_secs(60));
    let config = StoreConfig {
        query_timeout: Duration::from_millis(100),
        ..StoreConfig::default()
    };
    let repo = OrderStore::new(Arc::new(store), config);

    let result = repo.list_customers(&CancellationToken::new()).await;

    assert!(matches!(result, Err(AppError::Timeout)));
}
