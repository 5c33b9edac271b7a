//! Core infrastructure: configuration, error types, logging

pub mod config;
pub mod error;
pub mod logging;

pub use config::Config;
pub use error::{ChatError, ErrorResponse, Result};
pub use logging::Logger;
