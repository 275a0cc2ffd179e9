//! HTTP handlers.

pub mod health_handler;
pub mod order_handler;
pub mod wishlist_handler;

pub use health_handler::health_routes;
pub use order_handler::load_routes;
pub use wishlist_handler::wishlist_routes;
