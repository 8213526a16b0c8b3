//! Session manager: owns the lifecycle state machine for one surface.

use std::sync::{Arc, RwLock};

use thiserror::Error;
use tokio::sync::Mutex;

use pluribus_auth::{Credentials, Role, Surface, UserProfile};

use crate::gateway::{AuthGateway, GatewayError};
use crate::state::{SessionSnapshot, SessionState};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Credentials were rejected; session state is unchanged.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The authenticated role is not permitted on this surface. The session
    /// has been force-logged-out and the persisted pair discarded.
    #[error("role {role} is not permitted on the {surface} surface")]
    AccessDenied { surface: Surface, role: Role },

    /// The backend could not be reached; session state is unchanged.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The session context has been shut down.
    #[error("session context is closed")]
    ContextClosed,
}

/// Serialized session lifecycle for one surface.
///
/// All mutations (`initialize`, `login`, `logout`) run under one operation
/// lock held across their await points, so no two mutations interleave their
/// read-modify-write. Reads are lock-free snapshots of the settled state.
///
/// # Invariants
/// - Fail closed: every restore/login failure settles `Anonymous`; an
///   unverified or role-rejected user is never observable as authenticated.
/// - Exactly one externally observable state transition per operation call.
/// - No retry, no backoff, no timeout: an operation settles when its single
///   gateway exchange settles.
pub struct SessionManager {
    surface: Surface,
    gateway: Arc<dyn AuthGateway>,
    state: RwLock<SessionState>,
    op_lock: Mutex<()>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("surface", &self.surface)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(surface: Surface, gateway: Arc<dyn AuthGateway>) -> Self {
        Self {
            surface,
            gateway,
            state: RwLock::new(SessionState::Uninitialized),
            op_lock: Mutex::new(()),
        }
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// Point-in-time view of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from_state(&self.read_state())
    }

    /// The authenticated user, if any.
    ///
    /// While the snapshot still reports `loading`, absence of a user means
    /// "not known yet", not "anonymous"; gate on the flag first.
    pub fn current_user(&self) -> Option<UserProfile> {
        match self.read_state() {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.read_state(), SessionState::Authenticated(_))
    }

    /// Restore the persisted session, once, at startup.
    ///
    /// With no persisted pair this settles `Anonymous` immediately and never
    /// touches the network. Otherwise the persisted session is verified via
    /// one profile fetch; a permitted role authenticates, anything else
    /// (role rejection, revoked session, transport failure) force-logs-out
    /// and settles `Anonymous`. Never fails: the outcome is the snapshot.
    ///
    /// A second call is a no-op returning the current snapshot.
    pub async fn initialize(&self) -> SessionSnapshot {
        let _op = self.op_lock.lock().await;

        if !matches!(self.read_state(), SessionState::Uninitialized) {
            tracing::warn!(surface = %self.surface, "initialize called more than once; keeping current session");
            return self.snapshot();
        }

        if !self.gateway.has_persisted_session() {
            self.set_state(SessionState::Anonymous);
            return self.snapshot();
        }

        self.set_state(SessionState::Loading);

        match self.gateway.current_user().await {
            Ok(user) if self.surface.permits(user.role) => {
                tracing::info!(user_id = %user.id, role = %user.role, "session restored");
                self.set_state(SessionState::Authenticated(user));
            }
            Ok(user) => {
                tracing::warn!(
                    user_id = %user.id,
                    role = %user.role,
                    surface = %self.surface,
                    "restored role not permitted on this surface; forcing logout"
                );
                self.force_logout().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "session restore failed; settling anonymous");
                self.force_logout().await;
            }
        }

        self.snapshot()
    }

    /// Exchange credentials for an authenticated session.
    ///
    /// Rejected credentials and transport failures surface as errors and
    /// leave the session exactly as it was. A successful exchange whose role
    /// the surface does not permit is force-logged-out (discarding the
    /// just-persisted pair) and surfaces [`SessionError::AccessDenied`].
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile, SessionError> {
        let _op = self.op_lock.lock().await;

        let outcome = match self.gateway.login(credentials).await {
            Ok(outcome) => outcome,
            Err(GatewayError::InvalidCredentials(message)) => {
                return Err(SessionError::InvalidCredentials(message));
            }
            Err(err) => return Err(SessionError::Transport(err.to_string())),
        };

        if !self.surface.permits(outcome.user.role) {
            tracing::warn!(
                user_id = %outcome.user.id,
                role = %outcome.user.role,
                surface = %self.surface,
                "login rejected by surface policy; forcing logout"
            );
            self.force_logout().await;
            return Err(SessionError::AccessDenied {
                surface: self.surface,
                role: outcome.user.role,
            });
        }

        tracing::info!(user_id = %outcome.user.id, role = %outcome.user.role, "login succeeded");
        self.set_state(SessionState::Authenticated(outcome.user.clone()));
        Ok(outcome.user)
    }

    /// End the session. Idempotent from any state.
    ///
    /// The local session settles `Anonymous` unconditionally; server-side
    /// revocation is best-effort and its failure is logged, not surfaced.
    pub async fn logout(&self) -> SessionSnapshot {
        let _op = self.op_lock.lock().await;
        self.force_logout().await;
        self.snapshot()
    }

    /// Clear the persisted pair via the gateway and settle `Anonymous`.
    async fn force_logout(&self) {
        if let Err(err) = self.gateway.logout().await {
            tracing::warn!(error = %err, "server-side logout failed; local session cleared anyway");
        }
        self.set_state(SessionState::Anonymous);
    }

    fn read_state(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_state(&self, next: SessionState) {
        let mut guard = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = next;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
