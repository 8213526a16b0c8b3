//! Session lifecycle for client surfaces.
//!
//! One [`SessionManager`] per surface owns the authenticated-user state
//! machine: startup restore, login, logout, all serialized and fail-closed.
//! The auth backend sits behind the [`AuthGateway`] trait; this crate never
//! touches tokens or the network itself.

pub mod context;
pub mod gateway;
pub mod manager;
pub mod state;

pub use context::SessionContext;
pub use gateway::{AuthGateway, GatewayError, LoginOutcome};
pub use manager::{SessionError, SessionManager};
pub use state::{SessionSnapshot, SessionState};
