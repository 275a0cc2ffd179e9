//! Domain layer - Document model shared by the repositories and the gateway.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Documents here describe what is stored in (or projected from) the
//! document store; the store key is never part of a stored body.

pub mod constants;
pub mod error;
pub mod order;
pub mod wishlist;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use order::{Customer, Order, OrderWithCustomer, SeedPair};
pub use wishlist::{ensure_not_deleted, WishlistItem, WishlistItemDraft};
