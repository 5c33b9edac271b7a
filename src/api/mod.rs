//! HTTP API module

pub mod extract;
pub mod handlers;
pub mod routes;
pub mod server;

pub use handlers::AppState;
pub use server::ApiServer;
