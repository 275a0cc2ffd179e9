//! Request middleware.

mod cancellation;

pub use cancellation::cancellation_middleware;
