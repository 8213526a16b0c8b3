//! `pluribus-auth` — identity vocabulary and token boundary (zero-trust).
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod codec;
pub mod password;
pub mod role;
pub mod surface;
pub mod token;
pub mod user;

pub use claims::{AccessClaims, TokenValidationError, validate_claims};
pub use codec::{Hs256TokenCodec, TokenCodec, TokenError};
pub use password::{PasswordError, hash_password, verify_password};
pub use role::Role;
pub use surface::Surface;
pub use token::TokenPair;
pub use user::{Credentials, UserProfile, UserStatus};
