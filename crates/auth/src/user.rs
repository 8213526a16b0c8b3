//! User identity as the rest of the system consumes it.

use serde::{Deserialize, Serialize};

use pluribus_core::{Email, UserId};

use crate::Role;

/// User account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UserStatus {
    /// User is active and can authenticate/transact.
    #[default]
    Active,
    /// User is suspended and cannot authenticate.
    Suspended,
}

impl core::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "Active"),
            UserStatus::Suspended => write!(f, "Suspended"),
        }
    }
}

/// Authenticated user profile.
///
/// This is the shape sessions hold and `/auth/me` returns. It carries exactly
/// one role; there is no role accumulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
    pub role: Role,
    pub status: UserStatus,
}

/// Login credentials: identifier plus secret.
///
/// The secret is redacted from `Debug` output.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials {
            email: "alice@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("alice@example.com"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn profile_round_trips_through_json() {
        let profile = UserProfile {
            id: UserId::new(),
            email: Email::parse("seller@example.com").unwrap(),
            display_name: "Sample Seller".to_string(),
            role: Role::Seller,
            status: UserStatus::Active,
        };
        let json = serde_json::to_string(&profile).unwrap();
        let back: UserProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
        assert!(json.contains("\"SELLER\""));
    }
}
