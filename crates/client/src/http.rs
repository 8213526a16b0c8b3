//! HTTP gateway against the marketplace API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use pluribus_auth::{Credentials, TokenPair, UserProfile};
use pluribus_session::{AuthGateway, GatewayError, LoginOutcome};

use crate::store::TokenStore;

/// `AuthGateway` over the `/auth/*` wire contract.
///
/// Owns the persisted pair through its `TokenStore`: login saves, logout
/// clears, and an expired access token is refreshed (and re-persisted)
/// transparently inside `current_user`.
pub struct HttpAuthGateway<S> {
    http: reqwest::Client,
    base_url: String,
    store: S,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: UserProfile,
}

#[derive(Debug, Deserialize)]
struct LoginEnvelope {
    user: UserProfile,
    tokens: TokenPair,
}

#[derive(Debug, Deserialize)]
struct TokensEnvelope {
    tokens: TokenPair,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[allow(dead_code)]
    error: String,
    message: String,
}

enum ProfileFetch {
    Profile(UserProfile),
    Unauthorized,
}

impl<S: TokenStore> HttpAuthGateway<S> {
    pub fn new(base_url: impl Into<String>, store: S) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            store,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn load_pair(&self) -> Result<Option<TokenPair>, GatewayError> {
        self.store
            .load()
            .map_err(|e| GatewayError::Transport(e.to_string()))
    }

    async fn fetch_profile(&self, access: &str) -> Result<ProfileFetch, GatewayError> {
        let resp = self
            .http
            .get(self.url("/auth/me"))
            .bearer_auth(access)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        match resp.status() {
            StatusCode::OK => {
                let body: UserEnvelope = resp
                    .json()
                    .await
                    .map_err(|e| GatewayError::Transport(e.to_string()))?;
                Ok(ProfileFetch::Profile(body.user))
            }
            StatusCode::UNAUTHORIZED => Ok(ProfileFetch::Unauthorized),
            status => Err(GatewayError::Transport(format!(
                "unexpected status {status} from /auth/me"
            ))),
        }
    }

    /// Trade the refresh token for a new pair, persist it, and retry the
    /// profile fetch exactly once. A rejected refresh means the persisted
    /// session is dead: drop it locally.
    async fn refresh_then_retry(&self, stale: TokenPair) -> Result<UserProfile, GatewayError> {
        let resp = self
            .http
            .post(self.url("/auth/refresh"))
            .json(&serde_json::json!({ "refresh_token": stale.refresh }))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        match resp.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => {
                self.discard_pair();
                return Err(GatewayError::SessionRejected(
                    "refresh token rejected".to_string(),
                ));
            }
            status => {
                return Err(GatewayError::Transport(format!(
                    "unexpected status {status} from /auth/refresh"
                )));
            }
        }

        let body: TokensEnvelope = resp
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        self.store
            .save(&body.tokens)
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        match self.fetch_profile(&body.tokens.access).await? {
            ProfileFetch::Profile(user) => Ok(user),
            ProfileFetch::Unauthorized => {
                // Fresh token, still rejected: the account itself is locked out.
                self.discard_pair();
                Err(GatewayError::SessionRejected(
                    "session rejected after refresh".to_string(),
                ))
            }
        }
    }

    fn discard_pair(&self) {
        if let Err(err) = self.store.clear() {
            tracing::warn!(error = %err, "failed to clear persisted tokens");
        }
    }
}

#[async_trait]
impl<S: TokenStore> AuthGateway for HttpAuthGateway<S> {
    fn has_persisted_session(&self) -> bool {
        matches!(self.store.load(), Ok(Some(_)))
    }

    async fn current_user(&self) -> Result<UserProfile, GatewayError> {
        let pair = self.load_pair()?.ok_or(GatewayError::NotAuthenticated)?;

        match self.fetch_profile(&pair.access).await? {
            ProfileFetch::Profile(user) => Ok(user),
            ProfileFetch::Unauthorized => self.refresh_then_retry(pair).await,
        }
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, GatewayError> {
        let resp = self
            .http
            .post(self.url("/auth/login"))
            .json(credentials)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        match resp.status() {
            StatusCode::OK => {
                let body: LoginEnvelope = resp
                    .json()
                    .await
                    .map_err(|e| GatewayError::Transport(e.to_string()))?;
                self.store
                    .save(&body.tokens)
                    .map_err(|e| GatewayError::Transport(e.to_string()))?;
                Ok(LoginOutcome {
                    user: body.user,
                    tokens: body.tokens,
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(GatewayError::InvalidCredentials(error_message(resp).await))
            }
            status => Err(GatewayError::Transport(format!(
                "unexpected status {status} from /auth/login"
            ))),
        }
    }

    async fn logout(&self) -> Result<(), GatewayError> {
        let pair = match self.store.load() {
            Ok(pair) => pair,
            Err(err) => {
                tracing::warn!(error = %err, "could not read tokens during logout");
                None
            }
        };

        // Local clear first; revocation must not depend on the server.
        self.store
            .clear()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if let Some(pair) = pair {
            let result = self
                .http
                .post(self.url("/auth/logout"))
                .json(&serde_json::json!({ "refresh_token": pair.refresh }))
                .send()
                .await;
            if let Err(err) = result {
                tracing::warn!(error = %err, "server-side revocation failed");
            }
        }

        Ok(())
    }
}

async fn error_message(resp: reqwest::Response) -> String {
    match resp.json::<ErrorEnvelope>().await {
        Ok(body) => body.message,
        Err(_) => "request rejected".to_string(),
    }
}
