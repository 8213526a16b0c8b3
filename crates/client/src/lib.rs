//! HTTP auth gateway and token persistence for client processes.
//!
//! Wire a [`HttpAuthGateway`] (backed by a [`TokenStore`]) into a
//! `pluribus_session::SessionManager` to get the full session lifecycle
//! against a running API.

pub mod http;
pub mod store;

pub use http::HttpAuthGateway;
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};
