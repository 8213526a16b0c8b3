//! HTTP application wiring (Axum router + shared state).
//!
//! Layout:
//! - `routes/`: HTTP handlers, one file per surface area
//! - `errors.rs`: consistent JSON error responses
//! - this file: shared state, token issuance, router assembly

use std::sync::Arc;

use anyhow::Context;
use axum::{Extension, Router, routing::get};
use chrono::{Duration, Utc};
use tower::ServiceBuilder;

use pluribus_auth::{
    AccessClaims, Hs256TokenCodec, Role, TokenCodec, TokenError, TokenPair, UserProfile,
    UserStatus, hash_password,
};
use pluribus_catalog::{InMemoryListingStore, ListingStore};
use pluribus_core::{Email, UserId};
use pluribus_orders::{InMemoryOrderStore, OrderStore};

use crate::config::{ApiConfig, BootstrapAdmin};
use crate::directory::{InMemoryUserDirectory, UserDirectory, UserRecord};
use crate::middleware;
use crate::refresh::{InMemoryRefreshStore, RefreshStore};

pub mod errors;
pub mod routes;

pub struct AppState {
    pub codec: Arc<Hs256TokenCodec>,
    pub users: Arc<dyn UserDirectory>,
    pub refresh: Arc<dyn RefreshStore>,
    pub listings: Arc<dyn ListingStore>,
    pub orders: Arc<dyn OrderStore>,
    pub access_ttl: Duration,
}

impl AppState {
    fn new(config: &ApiConfig) -> Self {
        Self {
            codec: Arc::new(Hs256TokenCodec::new(config.jwt_secret.as_bytes())),
            users: Arc::new(InMemoryUserDirectory::new()),
            refresh: Arc::new(InMemoryRefreshStore::new(config.refresh_ttl)),
            listings: Arc::new(InMemoryListingStore::new()),
            orders: Arc::new(InMemoryOrderStore::new()),
            access_ttl: config.access_ttl,
        }
    }

    /// Mint an access/refresh pair for `user`.
    pub fn issue_tokens(&self, user: &UserProfile) -> Result<TokenPair, TokenError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user.id,
            role: user.role,
            iat: now,
            exp: now + self.access_ttl,
        };
        let access = self.codec.encode(&claims)?;
        let refresh = self.refresh.issue(user.id, now);
        Ok(TokenPair { access, refresh })
    }

    fn seed_bootstrap_admin(&self, bootstrap: &BootstrapAdmin) -> anyhow::Result<()> {
        let email = Email::parse(&bootstrap.email).context("ADMIN_EMAIL is not a valid email")?;
        if self.users.find_by_email(&email).is_some() {
            return Ok(());
        }

        let password_hash =
            hash_password(&bootstrap.password).context("failed to hash ADMIN_PASSWORD")?;
        let profile = UserProfile {
            id: UserId::new(),
            email,
            display_name: "Operator".to_string(),
            role: Role::Admin,
            status: UserStatus::Active,
        };

        self.users
            .create(UserRecord {
                profile,
                password_hash,
            })
            .context("failed to store bootstrap admin")?;

        tracing::info!(email = %bootstrap.email, "bootstrap admin created");
        Ok(())
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub async fn build_app(config: ApiConfig) -> Router {
    let state = Arc::new(AppState::new(&config));
    let auth_state = middleware::AuthState {
        codec: state.codec.clone(),
    };

    if let Some(bootstrap) = &config.bootstrap_admin {
        if let Err(err) = state.seed_bootstrap_admin(bootstrap) {
            tracing::warn!(error = %err, "bootstrap admin not created");
        }
    }

    // Protected routes: require a valid access token.
    let protected = routes::protected_router()
        .layer(Extension(state.clone()))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    let public = routes::public_router().layer(Extension(state));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(public)
        .merge(protected)
        .layer(ServiceBuilder::new())
}
