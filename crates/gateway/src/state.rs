//! Application state for dependency injection.

use std::sync::Arc;

use order_service_lib::{OrderRepository, OrderStore};
use store::StoreConnection;
use wishlist_service_lib::{ItemRepository, ItemStore};

use crate::config::GatewayConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub items: Arc<dyn ItemRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub connection: Arc<dyn StoreConnection>,
    pub config: GatewayConfig,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        items: Arc<dyn ItemRepository>,
        orders: Arc<dyn OrderRepository>,
        connection: Arc<dyn StoreConnection>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            items,
            orders,
            connection,
            config,
        }
    }

    /// Wire the store-backed repositories over one shared connection.
    pub fn from_connection(connection: Arc<dyn StoreConnection>, config: GatewayConfig) -> Self {
        let items = Arc::new(ItemStore::new(connection.clone(), config.store.clone()));
        let orders = Arc::new(OrderStore::new(connection.clone(), config.store.clone()));
        Self::new(items, orders, connection, config)
    }
}
