use serde::{Deserialize, Serialize};

/// Credentials handed out by a successful login: the short-lived access token
/// plus the refresh token that can mint its successor.
///
/// Both values are opaque to every consumer except the issuing API. The pair
/// is persisted and cleared as a unit, and redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl core::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}
