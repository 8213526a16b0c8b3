use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;

use pluribus_auth::Role;
use pluribus_catalog::NewListing;
use pluribus_core::ListingId;

use crate::app::{AppState, errors};
use crate::middleware::CurrentUser;

/// Seller console: everything here sits behind the bearer middleware and
/// requires a role that can sell.
pub fn seller_router() -> Router {
    Router::new()
        .route("/listings", post(create_listing).get(my_listings))
        .route("/listings/:id/archive", post(archive_listing))
}

pub async fn list_active(
    Extension(state): Extension<Arc<AppState>>,
) -> axum::response::Response {
    let items = state.listings.list_active();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn get_listing(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ListingId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid listing id");
        }
    };

    match state.listings.get(id) {
        Some(listing) => {
            (StatusCode::OK, Json(serde_json::json!({ "listing": listing }))).into_response()
        }
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "listing not found"),
    }
}

pub async fn create_listing(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<NewListing>,
) -> axum::response::Response {
    if !current.role().can_sell() {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "selling requires a seller role",
        );
    }

    let listing = match body.publish(current.user_id(), Utc::now()) {
        Ok(listing) => listing,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match state.listings.insert(listing.clone()) {
        Ok(()) => {
            tracing::info!(listing_id = %listing.id, seller_id = %listing.seller_id, "listing published");
            (
                StatusCode::CREATED,
                Json(serde_json::json!({ "listing": listing })),
            )
                .into_response()
        }
        Err(e) => errors::listing_error_to_response(e),
    }
}

pub async fn my_listings(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> axum::response::Response {
    if !current.role().can_sell() {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "selling requires a seller role",
        );
    }

    let items = state.listings.list_by_seller(current.user_id());
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

/// Archiving is allowed to the owning seller and to operators. Archiving an
/// already-archived listing is a no-op.
pub async fn archive_listing(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ListingId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid listing id");
        }
    };

    let Some(listing) = state.listings.get(id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "listing not found");
    };

    let is_owner = listing.seller_id == current.user_id();
    if !is_owner && current.role() != Role::Admin {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "only the seller or an operator can archive a listing",
        );
    }

    match state.listings.archive(id) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "id": id.to_string(), "status": "archived" })),
        )
            .into_response(),
        Err(e) => errors::listing_error_to_response(e),
    }
}
