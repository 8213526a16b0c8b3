//! Session lifecycle states and the read-only view handed to consumers.

use serde::Serialize;

use pluribus_auth::UserProfile;

/// Lifecycle of one surface's session.
///
/// # Invariants
/// - `Uninitialized → Loading → {Authenticated, Anonymous}` during startup
///   restore; restore with no persisted pair settles `Anonymous` directly.
/// - `Authenticated → Anonymous` on logout or role rejection. There is no
///   other way out of `Authenticated`.
/// - Every failure path settles in `Anonymous`; there is no error state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No session operation has run yet.
    Uninitialized,
    /// Startup restore is in flight.
    Loading,
    /// A permitted user holds the session.
    Authenticated(UserProfile),
    /// Settled without a user.
    Anonymous,
}

impl SessionState {
    /// True until startup restore has settled.
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Uninitialized | SessionState::Loading)
    }
}

/// Point-in-time view of the session.
///
/// `is_authenticated` is derived from the presence of a user, never stored,
/// so a snapshot cannot contradict itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    current_user: Option<UserProfile>,
    loading: bool,
}

impl SessionSnapshot {
    pub(crate) fn from_state(state: &SessionState) -> Self {
        let current_user = match state {
            SessionState::Authenticated(user) => Some(user.clone()),
            _ => None,
        };
        Self {
            current_user,
            loading: state.is_loading(),
        }
    }

    /// The authenticated user, if any.
    ///
    /// While [`loading`](Self::loading) is still true the restore outcome is
    /// unknown; gate on that flag before trusting an absent user.
    pub fn current_user(&self) -> Option<&UserProfile> {
        self.current_user.as_ref()
    }

    /// True until the startup restore has settled.
    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pluribus_auth::{Role, UserStatus};
    use pluribus_core::{Email, UserId};

    fn buyer() -> UserProfile {
        UserProfile {
            id: UserId::new(),
            email: Email::parse("buyer@example.com").unwrap(),
            display_name: "Buyer".to_string(),
            role: Role::Buyer,
            status: UserStatus::Active,
        }
    }

    #[test]
    fn loading_spans_uninitialized_and_loading() {
        assert!(SessionState::Uninitialized.is_loading());
        assert!(SessionState::Loading.is_loading());
        assert!(!SessionState::Authenticated(buyer()).is_loading());
        assert!(!SessionState::Anonymous.is_loading());
    }

    #[test]
    fn snapshot_derives_authentication_from_user_presence() {
        let authed = SessionSnapshot::from_state(&SessionState::Authenticated(buyer()));
        assert!(authed.is_authenticated());
        assert!(!authed.loading());

        let anon = SessionSnapshot::from_state(&SessionState::Anonymous);
        assert!(!anon.is_authenticated());
        assert!(anon.current_user().is_none());
    }
}
