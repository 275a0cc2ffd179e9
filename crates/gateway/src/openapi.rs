//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers::health_handler::{HealthResponse, ServiceHealth, ServiceStatus};
use crate::handlers::order_handler::LoadReport;
use crate::handlers::wishlist_handler::{CreateOrEditRequest, SavedItemResponse};
use domain::WishlistItem;

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health_handler::health_check,
        crate::handlers::wishlist_handler::list_items,
        crate::handlers::wishlist_handler::get_item,
        crate::handlers::wishlist_handler::create_or_edit,
        crate::handlers::wishlist_handler::delete_item,
        crate::handlers::wishlist_handler::soft_delete_item,
        crate::handlers::order_handler::load_customers,
        crate::handlers::order_handler::load_orders,
        crate::handlers::order_handler::load_orders_with_customers,
    ),
    components(
        schemas(
            WishlistItem,
            CreateOrEditRequest,
            SavedItemResponse,
            LoadReport,
            HealthResponse,
            ServiceStatus,
            ServiceHealth,
        )
    ),
    tags(
        (name = "Health", description = "Store reachability"),
        (name = "Wishlist", description = "Wishlist item management"),
        (name = "Load", description = "Timed bulk reads over customers and orders"),
    )
)]
pub struct ApiDoc;
