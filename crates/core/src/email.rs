//! Email address value object: validated once, normalized, compared by value.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A validated, lowercased email address.
///
/// Construction is the only validation point; every `Email` in the system is
/// already normalized. The check is intentionally shallow (non-empty local and
/// domain parts around a single `@`); deliverability is not a domain concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_lowercase();

        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(DomainError::validation("email must contain '@'"));
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::str::FromStr for Email {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let email = Email::parse("  Alice@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn parse_rejects_missing_at() {
        assert!(Email::parse("alice.example.com").is_err());
    }

    #[test]
    fn parse_rejects_empty_parts() {
        assert!(Email::parse("@example.com").is_err());
        assert!(Email::parse("alice@").is_err());
        assert!(Email::parse("   ").is_err());
    }

    #[test]
    fn parse_rejects_double_at() {
        assert!(Email::parse("alice@foo@example.com").is_err());
    }

    #[test]
    fn equal_by_normalized_value() {
        let a = Email::parse("bob@shop.test").unwrap();
        let b = Email::parse("BOB@SHOP.TEST").unwrap();
        assert_eq!(a, b);
    }
}
