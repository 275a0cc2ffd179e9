//! Order Service Library
//!
//! Bulk reads over customers and orders, including the order/customer join,
//! and sequential seeding of synthetic fixture data.

pub mod repository;

pub use repository::{OrderRepository, OrderStore};

#[cfg(any(test, feature = "test-utils"))]
pub use repository::MockOrderRepository;
