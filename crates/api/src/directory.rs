//! Account storage behind the auth and admin routes.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use pluribus_auth::{Role, UserProfile, UserStatus};
use pluribus_core::{Email, UserId};

/// A registered account: the public profile plus the server-side
/// credential hash. The hash never leaves this crate.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub profile: UserProfile,
    pub password_hash: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("email is already registered")]
    EmailTaken,
    #[error("user not found")]
    NotFound,
}

pub trait UserDirectory: Send + Sync {
    /// Insert a new account. Fails if the email is already registered.
    fn create(&self, record: UserRecord) -> Result<(), DirectoryError>;
    fn get(&self, id: UserId) -> Option<UserRecord>;
    fn find_by_email(&self, email: &Email) -> Option<UserRecord>;
    /// All accounts, oldest registration first.
    fn list(&self) -> Vec<UserRecord>;
    fn set_role(&self, id: UserId, role: Role) -> Result<UserRecord, DirectoryError>;
    fn set_status(&self, id: UserId, status: UserStatus) -> Result<UserRecord, DirectoryError>;
}

impl<D> UserDirectory for Arc<D>
where
    D: UserDirectory + ?Sized,
{
    fn create(&self, record: UserRecord) -> Result<(), DirectoryError> {
        (**self).create(record)
    }

    fn get(&self, id: UserId) -> Option<UserRecord> {
        (**self).get(id)
    }

    fn find_by_email(&self, email: &Email) -> Option<UserRecord> {
        (**self).find_by_email(email)
    }

    fn list(&self) -> Vec<UserRecord> {
        (**self).list()
    }

    fn set_role(&self, id: UserId, role: Role) -> Result<UserRecord, DirectoryError> {
        (**self).set_role(id, role)
    }

    fn set_status(&self, id: UserId, status: UserStatus) -> Result<UserRecord, DirectoryError> {
        (**self).set_status(id, status)
    }
}

#[derive(Default)]
struct DirectoryInner {
    by_id: HashMap<UserId, UserRecord>,
    by_email: HashMap<Email, UserId>,
}

/// Process-local directory. The email index and the record map are kept
/// under one lock so uniqueness can be checked and committed atomically.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    inner: RwLock<DirectoryInner>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, DirectoryInner> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, DirectoryInner> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn create(&self, record: UserRecord) -> Result<(), DirectoryError> {
        let mut inner = self.write();

        if inner.by_email.contains_key(&record.profile.email) {
            return Err(DirectoryError::EmailTaken);
        }

        inner
            .by_email
            .insert(record.profile.email.clone(), record.profile.id);
        inner.by_id.insert(record.profile.id, record);
        Ok(())
    }

    fn get(&self, id: UserId) -> Option<UserRecord> {
        self.read().by_id.get(&id).cloned()
    }

    fn find_by_email(&self, email: &Email) -> Option<UserRecord> {
        let inner = self.read();
        let id = inner.by_email.get(email)?;
        inner.by_id.get(id).cloned()
    }

    fn list(&self) -> Vec<UserRecord> {
        let mut records: Vec<UserRecord> = self.read().by_id.values().cloned().collect();
        // v7 ids are time-ordered, so this is registration order.
        records.sort_by_key(|record| *record.profile.id.as_uuid());
        records
    }

    fn set_role(&self, id: UserId, role: Role) -> Result<UserRecord, DirectoryError> {
        let mut inner = self.write();
        let record = inner.by_id.get_mut(&id).ok_or(DirectoryError::NotFound)?;
        record.profile.role = role;
        Ok(record.clone())
    }

    fn set_status(&self, id: UserId, status: UserStatus) -> Result<UserRecord, DirectoryError> {
        let mut inner = self.write();
        let record = inner.by_id.get_mut(&id).ok_or(DirectoryError::NotFound)?;
        record.profile.status = status;
        Ok(record.clone())
    }
}
