//! Domain-level constants.
//!
//! Keyspace names and field names addressed by the repositories.

// =============================================================================
// Keyspace
// =============================================================================

/// Default bucket holding every record family
pub const DEFAULT_BUCKET_NAME: &str = "Demo";

/// Scope used for all collections
pub const DEFAULT_SCOPE_NAME: &str = "_default";

/// Collection holding wishlist items
pub const COLLECTION_WISHLIST: &str = "wishlist";

/// Collection holding customers
pub const COLLECTION_CUSTOMER: &str = "customer";

/// Collection holding orders
pub const COLLECTION_ORDER: &str = "order";

// =============================================================================
// Document fields
// =============================================================================

/// Soft delete marker. Present = tombstone, missing = live.
pub const FIELD_DELETED: &str = "deleted";

/// Display name of items and customers
pub const FIELD_NAME: &str = "name";

/// Postal address of a customer
pub const FIELD_ADDRESS: &str = "address";

/// Key of the customer owning an order
pub const FIELD_CUSTOMER_ID: &str = "customerId";

/// Item description of an order
pub const FIELD_ITEMS: &str = "items";

/// Order price
pub const FIELD_PRICE: &str = "price";

// =============================================================================
// Time budgets
// =============================================================================

/// Default budget for point operations (get/insert/upsert/remove/mutate)
pub const DEFAULT_KV_TIMEOUT_MS: u64 = 2_500;

/// Default budget for queries
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 5_000;
