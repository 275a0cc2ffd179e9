//! Shared configuration structures.

use std::env;
use std::time::Duration;

use domain::{DEFAULT_BUCKET_NAME, DEFAULT_KV_TIMEOUT_MS, DEFAULT_QUERY_TIMEOUT_MS};
use serde::{Deserialize, Serialize};

/// Store access configuration shared by every repository.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Bucket holding all collections
    pub bucket_name: String,
    /// Budget for point operations
    pub kv_timeout: Duration,
    /// Budget for queries, including row materialization
    pub query_timeout: Duration,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            bucket_name: env::var("STORE_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET_NAME.to_string()),
            kv_timeout: Duration::from_millis(
                env::var("STORE_KV_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_KV_TIMEOUT_MS),
            ),
            query_timeout: Duration::from_millis(
                env::var("STORE_QUERY_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_QUERY_TIMEOUT_MS),
            ),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bucket_name: DEFAULT_BUCKET_NAME.to_string(),
            kv_timeout: Duration::from_millis(DEFAULT_KV_TIMEOUT_MS),
            query_timeout: Duration::from_millis(DEFAULT_QUERY_TIMEOUT_MS),
        }
    }
}
