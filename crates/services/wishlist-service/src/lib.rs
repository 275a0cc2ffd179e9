//! Wishlist Service Library
//!
//! Data access for wishlist items: listing, point lookups, create-or-edit,
//! and hard or soft deletion with optimistic concurrency on removal.

pub mod repository;

pub use repository::{ItemRepository, ItemStore};

#[cfg(any(test, feature = "test-utils"))]
pub use repository::MockItemRepository;
