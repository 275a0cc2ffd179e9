//! Load handlers over customers and orders.
//!
//! Each endpoint runs one listing and reports how many records came back and
//! how long the call took.

use std::future::Future;

use axum::{
    extract::{Extension, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;
use utoipa::ToSchema;

use common::AppResult;

use crate::state::AppState;

/// Result of a load run
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    /// Number of records returned
    #[schema(example = 1000)]
    pub records: usize,
    /// Wall-clock duration of the listing
    #[schema(example = 42)]
    pub elapsed_ms: u64,
}

/// Create load routes
pub fn load_routes() -> Router<AppState> {
    Router::new()
        .route("/customer", get(load_customers))
        .route("/order", get(load_orders))
        .route("/order-with-customer", get(load_orders_with_customers))
}

async fn measure<T, F>(name: &str, listing: F) -> AppResult<Json<LoadReport>>
where
    F: Future<Output = AppResult<Vec<T>>>,
{
    let started = Instant::now();
    let records = listing.await?.len();
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    info!(load = name, records, elapsed_ms, "Load finished");
    Ok(Json(LoadReport { records, elapsed_ms }))
}

/// Load every live customer
#[utoipa::path(
    get,
    path = "/load/customer",
    tag = "Load",
    responses(
        (status = 200, description = "Customers loaded", body = LoadReport),
        (status = 502, description = "Query did not complete successfully")
    )
)]
pub async fn load_customers(
    State(state): State<AppState>,
    Extension(cancellation): Extension<CancellationToken>,
) -> AppResult<Json<LoadReport>> {
    measure("customer", state.orders.list_customers(&cancellation)).await
}

/// Load every live order
#[utoipa::path(
    get,
    path = "/load/order",
    tag = "Load",
    responses(
        (status = 200, description = "Orders loaded", body = LoadReport),
        (status = 502, description = "Query did not complete successfully")
    )
)]
pub async fn load_orders(
    State(state): State<AppState>,
    Extension(cancellation): Extension<CancellationToken>,
) -> AppResult<Json<LoadReport>> {
    measure("order", state.orders.list_orders(&cancellation)).await
}

/// Load every live order joined with its customer
#[utoipa::path(
    get,
    path = "/load/order-with-customer",
    tag = "Load",
    responses(
        (status = 200, description = "Orders with customers loaded", body = LoadReport),
        (status = 502, description = "Query did not complete successfully")
    )
)]
pub async fn load_orders_with_customers(
    State(state): State<AppState>,
    Extension(cancellation): Extension<CancellationToken>,
) -> AppResult<Json<LoadReport>> {
    measure(
        "order-with-customer",
        state.orders.list_orders_with_customers(&cancellation),
    )
    .await
}
