//! Routing tests for the HTTP gateway.
//!
//! Repository behavior is mocked where the test is about status mapping, and
//! the in-memory store is used for end-to-end flows.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use common::{AppError, NotFoundReason};
use domain::{Customer, WishlistItem};
use gateway_lib::config::GatewayConfig;
use gateway_lib::routes::create_router;
use gateway_lib::state::AppState;
use order_service_lib::MockOrderRepository;
use store::{MemoryStore, StoreConnection};
use wishlist_service_lib::MockItemRepository;

fn app_with(items: MockItemRepository, orders: MockOrderRepository) -> Router {
    let connection: Arc<dyn StoreConnection> = Arc::new(MemoryStore::default());
    let state = AppState::new(Arc::new(items), Arc::new(orders), connection, GatewayConfig::default());
    create_router(state)
}

fn memory_app() -> Router {
    let connection: Arc<dyn StoreConnection> = Arc::new(MemoryStore::default());
    create_router(AppState::from_connection(connection, GatewayConfig::default()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_get_item_returns_item() {
    let id = Uuid::new_v4();
    let mut items = MockItemRepository::new();
    items
        .expect_get_by_id()
        .withf(move |requested, token| *requested == id && !token.is_cancelled())
        .times(1)
        .returning(|id, _| {
            Ok(WishlistItem {
                id,
                name: "Globe".to_string(),
                deleted: None,
            })
        });

    let app = app_with(items, MockOrderRepository::new());
    let (status, body) = send(&app, Method::GET, &format!("/list/get/{}", id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.to_string());
    assert_eq!(body["name"], "Globe");
    assert_eq!(body["deleted"], Value::Null);
}

#[tokio::test]
async fn test_unparseable_id_is_sent_as_nil() {
    let mut items = MockItemRepository::new();
    items
        .expect_get_by_id()
        .withf(|requested, _| requested.is_nil())
        .times(1)
        .returning(|_, _| Err(AppError::NotFound(NotFoundReason::InvalidId)));

    let app = app_with(items, MockOrderRepository::new());
    let (status, body) = send(&app, Method::GET, "/list/get/not-a-uuid", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_not_found_causes_look_identical() {
    let mut items = MockItemRepository::new();
    let mut calls = 0;
    items.expect_get_by_id().times(2).returning(move |id, _| {
        calls += 1;
        if calls == 1 {
            Err(AppError::NotFound(NotFoundReason::Missing(id.to_string())))
        } else {
            Err(AppError::NotFound(NotFoundReason::SoftDeleted(chrono::Utc::now())))
        }
    });

    let app = app_with(items, MockOrderRepository::new());
    let missing = send(&app, Method::GET, &format!("/list/get/{}", Uuid::new_v4()), None).await;
    let deleted = send(&app, Method::GET, &format!("/list/get/{}", Uuid::new_v4()), None).await;

    assert_eq!(missing, deleted);
}

#[tokio::test]
async fn test_create_or_edit_rejects_empty_name() {
    let mut items = MockItemRepository::new();
    items.expect_create_or_edit().never();

    let app = app_with(items, MockOrderRepository::new());
    let (status, body) = send(&app, Method::POST, "/list/create-or-edit", Some(json!({ "name": "" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Name cannot be empty");
}

#[tokio::test]
async fn test_create_or_edit_rejects_malformed_body() {
    let mut items = MockItemRepository::new();
    items.expect_create_or_edit().never();

    let app = app_with(items, MockOrderRepository::new());
    let (status, body) = send(&app, Method::POST, "/list/create-or-edit", Some(json!({ "id": 7 }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_create_or_edit_no_change() {
    let mut items = MockItemRepository::new();
    items
        .expect_create_or_edit()
        .withf(|draft, _| draft.id.as_deref() == Some("abc") && draft.name == "Globe")
        .times(1)
        .returning(|_, _| Err(AppError::NoChange));

    let app = app_with(items, MockOrderRepository::new());
    let (status, body) = send(
        &app,
        Method::POST,
        "/list/create-or-edit",
        Some(json!({ "id": "abc", "name": "Globe" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "NO_CHANGE");
}

#[tokio::test]
async fn test_delete_routes_pick_mode() {
    let id = Uuid::new_v4();
    let mut items = MockItemRepository::new();
    items
        .expect_delete()
        .withf(move |requested, soft, _| *requested == id && !*soft)
        .times(1)
        .returning(|_, _, _| Ok(()));
    items
        .expect_delete()
        .withf(move |requested, soft, _| *requested == id && *soft)
        .times(1)
        .returning(|_, _, _| Ok(()));

    let app = app_with(items, MockOrderRepository::new());
    let (hard, _) = send(&app, Method::DELETE, &format!("/list/delete/{}", id), None).await;
    let (soft, _) = send(&app, Method::DELETE, &format!("/list/soft-delete/{}", id), None).await;

    assert_eq!(hard, StatusCode::NO_CONTENT);
    assert_eq!(soft, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_conflict_and_timeout_statuses() {
    let mut items = MockItemRepository::new();
    items
        .expect_delete()
        .returning(|_, _, _| Err(AppError::conflict("Document was modified concurrently")));
    items.expect_list().returning(|_| Err(AppError::Timeout));

    let app = app_with(items, MockOrderRepository::new());
    let (conflict, _) = send(&app, Method::DELETE, &format!("/list/delete/{}", Uuid::new_v4()), None).await;
    let (timeout, body) = send(&app, Method::GET, "/list", None).await;

    assert_eq!(conflict, StatusCode::CONFLICT);
    assert_eq!(timeout, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"]["code"], "TIMEOUT");
}

#[tokio::test]
async fn test_load_customers_reports_count() {
    let mut orders = MockOrderRepository::new();
    orders.expect_list_customers().times(1).returning(|_| {
        Ok(vec![
            Customer::new(Uuid::new_v4(), "Customer_1", "Address_1"),
            Customer::new(Uuid::new_v4(), "Customer_2", "Address_2"),
        ])
    });

    let app = app_with(MockItemRepository::new(), orders);
    let (status, body) = send(&app, Method::GET, "/load/customer", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"], 2);
    assert!(body["elapsedMs"].is_u64());
}

#[tokio::test]
async fn test_health_reports_store() {
    let (status, body) = send(&memory_app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["services"]["store"]["status"], "healthy");

    let connection: Arc<dyn StoreConnection> = Arc::new(MemoryStore::new(["Other"]));
    let app = create_router(AppState::from_connection(connection, GatewayConfig::default()));
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let (status, body) = send(&memory_app(), Method::GET, "/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/list/create-or-edit"].is_object());
    assert!(body["paths"]["/load/order-with-customer"].is_object());
}

#[tokio::test]
async fn test_wishlist_flow_end_to_end() {
    let app = memory_app();

    let (status, saved) = send(&app, Method::POST, "/list/create-or-edit", Some(json!({ "name": "Globe" }))).await;
    assert_eq!(status, StatusCode::OK);
    let id = saved["id"].as_str().unwrap().to_string();

    let (status, list) = send(&app, Method::GET, "/list", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, item) = send(&app, Method::GET, &format!("/list/get/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["name"], "Globe");

    let (status, _) = send(&app, Method::DELETE, &format!("/list/soft-delete/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/list/get/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &format!("/list/soft-delete/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("/list/delete/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &format!("/list/get/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&app, Method::GET, "/list", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_seed_then_load() {
    let connection: Arc<dyn StoreConnection> = Arc::new(MemoryStore::default());
    let config = GatewayConfig::default();
    let written = gateway_lib::seed(connection.clone(), &config, 0, 5).await.unwrap();
    assert_eq!(written, 5);

    let app = create_router(AppState::from_connection(connection, config));
    let (status, body) = send(&app, Method::GET, "/load/order-with-customer", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"], 5);
}
