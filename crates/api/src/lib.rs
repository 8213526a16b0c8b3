//! HTTP API: server, routing, and request/response mapping.

pub mod app;
pub mod config;
pub mod directory;
pub mod middleware;
pub mod refresh;

pub use app::build_app;
pub use config::ApiConfig;
