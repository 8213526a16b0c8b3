//! Operator console routes.
//!
//! Everything here requires the admin role. The gate checks the live
//! directory record, not just the token claims, so demoting or suspending
//! an operator locks them out immediately instead of at token expiry.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;

use pluribus_auth::{Role, Surface, UserStatus};
use pluribus_core::UserId;

use crate::app::{AppState, errors};
use crate::directory::DirectoryError;
use crate::middleware::CurrentUser;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
        .route("/users/:id/role", post(change_role))
        .route("/users/:id/suspend", post(suspend_user))
        .route("/users/:id/activate", post(activate_user))
        .route("/orders", get(list_orders))
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /admin/users - List every account
pub async fn list_users(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> axum::response::Response {
    if let Err(resp) = require_operator(&state, &current) {
        return resp;
    }

    let items: Vec<serde_json::Value> = state
        .users
        .list()
        .into_iter()
        .map(|record| serde_json::json!(record.profile))
        .collect();

    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

/// GET /admin/users/:id - Get one account
pub async fn get_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_operator(&state, &current) {
        return resp;
    }
    let user_id = match parse_user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match state.users.get(user_id) {
        Some(record) => (
            StatusCode::OK,
            Json(serde_json::json!({ "user": record.profile })),
        )
            .into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
    }
}

/// POST /admin/users/:id/role - Change an account's role
///
/// Demoting an admin is how operator access is revoked; their persisted
/// sessions are rejected the next time a client checks the profile.
pub async fn change_role(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<ChangeRoleRequest>,
) -> axum::response::Response {
    if let Err(resp) = require_operator(&state, &current) {
        return resp;
    }
    let user_id = match parse_user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    if user_id == current.user_id() && body.role != Role::Admin {
        return errors::json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "invariant_violation",
            "operators cannot demote themselves",
        );
    }

    match state.users.set_role(user_id, body.role) {
        Ok(record) => {
            tracing::info!(user_id = %user_id, role = %body.role, "role changed");
            (
                StatusCode::OK,
                Json(serde_json::json!({ "user": record.profile })),
            )
                .into_response()
        }
        Err(DirectoryError::NotFound) => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found")
        }
        Err(err) => {
            tracing::error!(error = %err, "role change failed");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "role change failed",
            )
        }
    }
}

/// POST /admin/users/:id/suspend - Suspend an account
///
/// Also revokes the account's refresh tokens, so persisted sessions cannot
/// mint new access tokens; outstanding access tokens age out on their own.
pub async fn suspend_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_operator(&state, &current) {
        return resp;
    }
    let user_id = match parse_user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    if user_id == current.user_id() {
        return errors::json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "invariant_violation",
            "operators cannot suspend themselves",
        );
    }

    match state.users.set_status(user_id, UserStatus::Suspended) {
        Ok(record) => {
            state.refresh.revoke_all_for(user_id);
            tracing::info!(user_id = %user_id, "user suspended");
            (
                StatusCode::OK,
                Json(serde_json::json!({ "user": record.profile })),
            )
                .into_response()
        }
        Err(DirectoryError::NotFound) => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found")
        }
        Err(err) => {
            tracing::error!(error = %err, "suspension failed");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "suspension failed",
            )
        }
    }
}

/// POST /admin/users/:id/activate - Lift a suspension
pub async fn activate_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_operator(&state, &current) {
        return resp;
    }
    let user_id = match parse_user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match state.users.set_status(user_id, UserStatus::Active) {
        Ok(record) => {
            tracing::info!(user_id = %user_id, "user activated");
            (
                StatusCode::OK,
                Json(serde_json::json!({ "user": record.profile })),
            )
                .into_response()
        }
        Err(DirectoryError::NotFound) => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found")
        }
        Err(err) => {
            tracing::error!(error = %err, "activation failed");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "activation failed",
            )
        }
    }
}

/// GET /admin/orders - Every order in the marketplace
pub async fn list_orders(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> axum::response::Response {
    if let Err(resp) = require_operator(&state, &current) {
        return resp;
    }

    let items = state.orders.list_all();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn require_operator(
    state: &AppState,
    current: &CurrentUser,
) -> Result<(), axum::response::Response> {
    let forbidden = || {
        errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "operator access required",
        )
    };

    if !Surface::Admin.permits(current.role()) {
        return Err(forbidden());
    }

    // The claims may be minutes old; re-check the directory.
    match state.users.get(current.user_id()) {
        Some(record)
            if record.profile.status == UserStatus::Active
                && Surface::Admin.permits(record.profile.role) =>
        {
            Ok(())
        }
        _ => Err(forbidden()),
    }
}

fn parse_user_id(raw: &str) -> Result<UserId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id")
    })
}
