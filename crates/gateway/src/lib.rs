//! API Gateway Library
//!
//! HTTP surface over the wishlist and order repositories, plus the seeding
//! entry point used by the CLI.

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use order_service_lib::{OrderRepository, OrderStore};
use store::{MemoryStore, StoreConnection};

use crate::config::GatewayConfig;
use crate::routes::create_router;
use crate::state::AppState;

/// Open the store connection for the configured bucket.
pub fn connect(config: &GatewayConfig) -> Arc<dyn StoreConnection> {
    Arc::new(MemoryStore::new([config.store.bucket_name.clone()]))
}

/// Run the HTTP server, optionally preloading `preload` fixture pairs.
pub async fn run_server(config: GatewayConfig, preload: u64) -> Result<(), Box<dyn std::error::Error>> {
    let connection = connect(&config);

    if preload > 0 {
        let written = seed(connection.clone(), &config, 0, preload).await?;
        info!("Preloaded {} customer/order pairs", written);
    }

    // Create app state
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = AppState::from_connection(connection, config);

    // Build router
    let app = create_router(state).layer(TraceLayer::new_for_http());

    info!("Gateway listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Insert `count` customer/order pairs after `start`. Ctrl-C stops between writes.
pub async fn seed(
    connection: Arc<dyn StoreConnection>,
    config: &GatewayConfig,
    start: u64,
    count: u64,
) -> Result<u64, Box<dyn std::error::Error>> {
    let repo = OrderStore::new(connection, config.store.clone());

    let cancellation = CancellationToken::new();
    let on_signal = cancellation.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let result = repo.seed_data(start, count, &cancellation).await;
    watcher.abort();

    Ok(result?)
}
