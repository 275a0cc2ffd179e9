//! Customer and order documents.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::constants::{FIELD_ADDRESS, FIELD_CUSTOMER_ID, FIELD_ITEMS, FIELD_NAME, FIELD_PRICE};
use crate::error::{DomainError, DomainResult};

/// Customer document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub id: Uuid,
    pub name: String,
    pub address: String,
}

impl Customer {
    pub fn new(id: Uuid, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
        }
    }

    /// Stored body (the key lives in metadata).
    pub fn body(&self) -> Value {
        json!({ FIELD_NAME: self.name, FIELD_ADDRESS: self.address })
    }
}

/// Order document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default)]
    pub id: Uuid,
    pub customer_id: Uuid,
    pub items: String,
    pub price: f64,
}

impl Order {
    /// Build an order, rejecting negative or non-finite prices.
    pub fn new(id: Uuid, customer_id: Uuid, items: impl Into<String>, price: f64) -> DomainResult<Self> {
        if !price.is_finite() || price < 0.0 {
            return Err(DomainError::validation(format!(
                "Order price must be a non-negative number, got {}",
                price
            )));
        }

        Ok(Self {
            id,
            customer_id,
            items: items.into(),
            price,
        })
    }

    /// Stored body (the key lives in metadata).
    pub fn body(&self) -> Value {
        json!({
            FIELD_CUSTOMER_ID: self.customer_id,
            FIELD_ITEMS: self.items,
            FIELD_PRICE: self.price,
        })
    }
}

/// Order joined with its customer. Produced by queries only, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct OrderWithCustomer {
    pub id: Uuid,
    pub items: String,
    pub price: f64,
    pub customer_name: String,
    pub customer_address: String,
}

/// Synthetic customer/order pair used to populate fixtures.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedPair {
    pub customer: Customer,
    pub order: Order,
}

impl SeedPair {
    /// Generate the pair numbered `n` (1-based) with fresh keys.
    pub fn generate(n: u64) -> Self {
        let customer = Customer::new(
            Uuid::new_v4(),
            format!("Customer_{}", n),
            format!("Address_{}", n),
        );
        let order = Order {
            id: Uuid::new_v4(),
            customer_id: customer.id,
            items: format!("Items_{}", n),
            price: n as f64,
        };

        Self { customer, order }
    }
}
