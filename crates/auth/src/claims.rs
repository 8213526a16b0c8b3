use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pluribus_core::UserId;

use crate::Role;

/// Access-token claims model (transport-agnostic).
///
/// This is the minimal set of claims Pluribus expects once a token has been
/// decoded/verified by the codec. Timestamps serialize as integer seconds so
/// `iat`/`exp` are standard JWT registered claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the user the token was issued to.
    pub sub: UserId,

    /// Role held at issue time.
    pub role: Role,

    /// Issued-at timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    /// Expiration timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate access-token claims.
///
/// Note: this validates the *claims* only. Signature verification/decoding is
/// intentionally outside this module.
pub fn validate_claims(
    claims: &AccessClaims,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn claims_at(iat_secs: i64, exp_secs: i64) -> AccessClaims {
        AccessClaims {
            sub: UserId::new(),
            role: Role::Buyer,
            iat: Utc.timestamp_opt(iat_secs, 0).unwrap(),
            exp: Utc.timestamp_opt(exp_secs, 0).unwrap(),
        }
    }

    #[test]
    fn valid_inside_window() {
        let claims = claims_at(1_000, 2_000);
        let now = Utc.timestamp_opt(1_500, 0).unwrap();
        assert!(validate_claims(&claims, now).is_ok());
    }

    #[test]
    fn expired_at_and_after_exp() {
        let claims = claims_at(1_000, 2_000);
        let at_exp = Utc.timestamp_opt(2_000, 0).unwrap();
        assert_eq!(
            validate_claims(&claims, at_exp),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&claims, at_exp + Duration::hours(1)),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn not_yet_valid_before_iat() {
        let claims = claims_at(1_000, 2_000);
        let now = Utc.timestamp_opt(999, 0).unwrap();
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn inverted_window_rejected_regardless_of_now() {
        let claims = claims_at(2_000, 2_000);
        let now = Utc.timestamp_opt(2_500, 0).unwrap();
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    proptest! {
        /// For any well-formed window, the verdict is a pure function of where
        /// `now` falls relative to it.
        #[test]
        fn verdict_follows_window_position(
            iat in 0i64..1_000_000,
            ttl in 1i64..1_000_000,
            offset in -1_000_000i64..2_000_000,
        ) {
            let exp = iat + ttl;
            let claims = claims_at(iat, exp);
            let now = Utc.timestamp_opt(iat + offset, 0).unwrap();

            let expected = if offset < 0 {
                Err(TokenValidationError::NotYetValid)
            } else if iat + offset >= exp {
                Err(TokenValidationError::Expired)
            } else {
                Ok(())
            };

            prop_assert_eq!(validate_claims(&claims, now), expected);
        }

        /// `exp <= iat` is structurally invalid before any clock comparison.
        #[test]
        fn inverted_window_always_loses(
            iat in 0i64..1_000_000,
            backwards in 0i64..1_000,
            now in 0i64..2_000_000,
        ) {
            let claims = claims_at(iat, iat - backwards);
            let now = Utc.timestamp_opt(now, 0).unwrap();
            prop_assert_eq!(
                validate_claims(&claims, now),
                Err(TokenValidationError::InvalidTimeWindow)
            );
        }
    }
}
