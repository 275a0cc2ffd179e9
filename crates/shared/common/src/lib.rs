//! Common utilities shared by the repositories and the gateway.
//!
//! This crate provides:
//! - Classified error kinds and their HTTP mapping
//! - Store configuration

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult, NotFoundReason, OptionExt};
