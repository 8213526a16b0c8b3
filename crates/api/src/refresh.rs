//! Single-use refresh tokens.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use pluribus_core::UserId;

#[derive(Debug, Clone)]
struct RefreshRecord {
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error("refresh token is invalid or has already been used")]
    Invalid,
    #[error("refresh token has expired")]
    Expired,
}

/// Registry of outstanding refresh tokens.
///
/// `consume` removes the token whether or not it is still valid, so one
/// token can never mint two successors and replaying a spent token looks
/// the same as presenting an unknown one.
pub trait RefreshStore: Send + Sync {
    fn issue(&self, user_id: UserId, now: DateTime<Utc>) -> String;
    fn consume(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, RefreshError>;
    /// Drop one token (logout). Unknown tokens are ignored.
    fn revoke(&self, token: &str);
    /// Drop every token belonging to `user_id` (suspension).
    fn revoke_all_for(&self, user_id: UserId);
}

impl<S> RefreshStore for Arc<S>
where
    S: RefreshStore + ?Sized,
{
    fn issue(&self, user_id: UserId, now: DateTime<Utc>) -> String {
        (**self).issue(user_id, now)
    }

    fn consume(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, RefreshError> {
        (**self).consume(token, now)
    }

    fn revoke(&self, token: &str) {
        (**self).revoke(token)
    }

    fn revoke_all_for(&self, user_id: UserId) {
        (**self).revoke_all_for(user_id)
    }
}

pub struct InMemoryRefreshStore {
    ttl: Duration,
    tokens: RwLock<HashMap<String, RefreshRecord>>,
}

impl InMemoryRefreshStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            tokens: RwLock::new(HashMap::new()),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, RefreshRecord>> {
        self.tokens
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RefreshStore for InMemoryRefreshStore {
    fn issue(&self, user_id: UserId, now: DateTime<Utc>) -> String {
        // Opaque handle; the v4 random bits are the entire secret.
        let token = Uuid::new_v4().simple().to_string();
        self.write().insert(
            token.clone(),
            RefreshRecord {
                user_id,
                expires_at: now + self.ttl,
            },
        );
        token
    }

    fn consume(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, RefreshError> {
        let record = self.write().remove(token).ok_or(RefreshError::Invalid)?;
        if now >= record.expires_at {
            return Err(RefreshError::Expired);
        }
        Ok(record.user_id)
    }

    fn revoke(&self, token: &str) {
        self.write().remove(token);
    }

    fn revoke_all_for(&self, user_id: UserId) {
        self.write().retain(|_, record| record.user_id != user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemoryRefreshStore {
        InMemoryRefreshStore::new(Duration::days(1))
    }

    #[test]
    fn issued_token_redeems_once() {
        let store = store();
        let user = UserId::new();
        let now = Utc::now();

        let token = store.issue(user, now);
        assert_eq!(store.consume(&token, now), Ok(user));
        assert_eq!(store.consume(&token, now), Err(RefreshError::Invalid));
    }

    #[test]
    fn expired_token_is_rejected_and_spent() {
        let store = store();
        let user = UserId::new();
        let issued = Utc::now();

        let token = store.issue(user, issued);
        let later = issued + Duration::days(2);

        assert_eq!(store.consume(&token, later), Err(RefreshError::Expired));
        // The failed redemption still burned it.
        assert_eq!(store.consume(&token, issued), Err(RefreshError::Invalid));
    }

    #[test]
    fn revoke_drops_a_single_token() {
        let store = store();
        let user = UserId::new();
        let now = Utc::now();

        let token = store.issue(user, now);
        store.revoke(&token);
        store.revoke(&token);

        assert_eq!(store.consume(&token, now), Err(RefreshError::Invalid));
    }

    #[test]
    fn revoke_all_for_leaves_other_users_alone() {
        let store = store();
        let (alice, bob) = (UserId::new(), UserId::new());
        let now = Utc::now();

        let alice_token = store.issue(alice, now);
        let bob_token = store.issue(bob, now);

        store.revoke_all_for(alice);

        assert_eq!(
            store.consume(&alice_token, now),
            Err(RefreshError::Invalid)
        );
        assert_eq!(store.consume(&bob_token, now), Ok(bob));
    }

    #[test]
    fn tokens_are_unique_per_issue() {
        let store = store();
        let user = UserId::new();
        let now = Utc::now();

        let a = store.issue(user, now);
        let b = store.issue(user, now);
        assert_ne!(a, b);
    }
}
