use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use pluribus_auth::{
    Credentials, Role, UserProfile, UserStatus, hash_password, verify_password,
};
use pluribus_core::{Email, UserId};

use crate::app::{AppState, errors};
use crate::directory::{DirectoryError, UserRecord};
use crate::middleware::CurrentUser;

const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> axum::response::Response {
    let email = match Email::parse(&body.email) {
        Ok(email) => email,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let display_name = body.display_name.trim();
    if display_name.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "display name cannot be empty",
        );
    }

    if body.password.chars().count() < MIN_PASSWORD_CHARS {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "weak_password",
            format!("password must be at least {MIN_PASSWORD_CHARS} characters"),
        );
    }

    if !body.role.assignable_at_registration() {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "role_not_assignable",
            "this role cannot be chosen at registration",
        );
    }

    let password_hash = match hash_password(&body.password) {
        Ok(hash) => hash,
        Err(err) => {
            tracing::error!(error = %err, "password hashing failed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "registration failed",
            );
        }
    };

    let profile = UserProfile {
        id: UserId::new(),
        email,
        display_name: display_name.to_string(),
        role: body.role,
        status: UserStatus::Active,
    };

    match state.users.create(UserRecord {
        profile: profile.clone(),
        password_hash,
    }) {
        Ok(()) => {
            tracing::info!(user_id = %profile.id, role = %profile.role, "user registered");
            (
                StatusCode::CREATED,
                Json(serde_json::json!({ "user": profile })),
            )
                .into_response()
        }
        Err(DirectoryError::EmailTaken) => errors::json_error(
            StatusCode::CONFLICT,
            "email_taken",
            "email is already registered",
        ),
        Err(err) => {
            tracing::error!(error = %err, "registration failed");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "registration failed",
            )
        }
    }
}

pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<Credentials>,
) -> axum::response::Response {
    // Unknown email, unparseable email, and wrong password all produce the
    // same response; the endpoint does not reveal which accounts exist.
    let Ok(email) = Email::parse(&body.email) else {
        return invalid_credentials();
    };
    let Some(record) = state.users.find_by_email(&email) else {
        return invalid_credentials();
    };
    if !verify_password(&record.password_hash, &body.password) {
        return invalid_credentials();
    }

    if record.profile.status == UserStatus::Suspended {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "account_suspended",
            "account is suspended",
        );
    }

    match state.issue_tokens(&record.profile) {
        Ok(tokens) => {
            tracing::info!(user_id = %record.profile.id, "login succeeded");
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "user": record.profile,
                    "tokens": tokens,
                })),
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "token issuance failed");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "login failed",
            )
        }
    }
}

pub async fn refresh(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> axum::response::Response {
    let now = chrono::Utc::now();

    let user_id = match state.refresh.consume(&body.refresh_token, now) {
        Ok(user_id) => user_id,
        Err(err) => {
            return errors::json_error(StatusCode::UNAUTHORIZED, "refresh_rejected", err.to_string());
        }
    };

    // The old token is already burned; a dead account gets nothing new.
    let Some(record) = state.users.get(user_id) else {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "refresh_rejected",
            "account no longer exists",
        );
    };
    if record.profile.status == UserStatus::Suspended {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "refresh_rejected",
            "account is suspended",
        );
    }

    match state.issue_tokens(&record.profile) {
        Ok(tokens) => (
            StatusCode::OK,
            Json(serde_json::json!({ "tokens": tokens })),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "token issuance failed");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "refresh failed",
            )
        }
    }
}

/// Returns the live directory record, not the claims snapshot, so role
/// changes and suspensions show up on the very next call.
pub async fn me(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> axum::response::Response {
    let Some(record) = state.users.get(current.user_id()) else {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "not_authenticated",
            "account no longer exists",
        );
    };
    if record.profile.status == UserStatus::Suspended {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "not_authenticated",
            "account is suspended",
        );
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({ "user": record.profile })),
    )
        .into_response()
}

/// Revokes the presented refresh token. Always succeeds; logging out an
/// already-dead session is not an error.
pub async fn logout(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> StatusCode {
    state.refresh.revoke(&body.refresh_token);
    StatusCode::NO_CONTENT
}

fn invalid_credentials() -> axum::response::Response {
    errors::json_error(
        StatusCode::UNAUTHORIZED,
        "invalid_credentials",
        "invalid email or password",
    )
}
