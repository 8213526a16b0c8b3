//! Collaborator contract between the session manager and the auth backend.

use async_trait::async_trait;
use thiserror::Error;

use pluribus_auth::{Credentials, TokenPair, UserProfile};

/// Outcome of a successful credential exchange.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserProfile,
    pub tokens: TokenPair,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// No usable persisted session.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Credential exchange was rejected.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The persisted session was rejected by the backend and has been
    /// discarded locally.
    #[error("session rejected: {0}")]
    SessionRejected(String),

    /// The backend could not be reached or answered out of contract.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Everything the session manager needs from the auth backend.
///
/// Token persistence is the gateway's side effect: `login` persists the pair
/// before returning, `logout` clears it. Nothing else in the application may
/// write the persisted pair.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Whether a persisted token pair exists locally.
    ///
    /// Must not touch the network; startup restore uses this to decide
    /// whether a profile fetch is worth attempting at all.
    fn has_persisted_session(&self) -> bool;

    /// Fetch the profile behind the persisted session.
    async fn current_user(&self) -> Result<UserProfile, GatewayError>;

    /// Exchange credentials for a profile and token pair.
    async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, GatewayError>;

    /// Discard the persisted pair and best-effort revoke it server-side.
    ///
    /// Local clearing must succeed regardless of backend reachability.
    async fn logout(&self) -> Result<(), GatewayError>;
}
