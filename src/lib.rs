//! Member Chat Backend Library
//!
//! This library provides the core functionality for the member chat backend:
//! token authentication, member management, and the shared message feed
//! exposed over a REST API.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;

// Re-export commonly used types
pub use crate::core::{ChatError, Config};
pub use api::ApiServer;
pub use db::DatabaseManager;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias for the library
pub type Result<T> = anyhow::Result<T>;
