use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;

use pluribus_auth::Role;
use pluribus_core::{ListingId, OrderId};
use pluribus_orders::Order;

use crate::app::{AppState, errors};
use crate::middleware::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", post(place_order).get(my_orders))
        .route("/:id", get(get_order))
        .route("/:id/cancel", post(cancel_order))
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub listing_id: ListingId,
    pub quantity: u32,
}

pub async fn place_order(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<PlaceOrderRequest>,
) -> axum::response::Response {
    if !current.role().can_buy() {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "buying requires a buyer role",
        );
    }

    let Some(listing) = state.listings.get(body.listing_id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "listing not found");
    };

    let order = match Order::place(&listing, current.user_id(), body.quantity, Utc::now()) {
        Ok(order) => order,
        Err(e) => return errors::domain_error_to_response(e),
    };

    // Stock is checked and taken in one step; a stale `listing` snapshot
    // cannot oversell.
    if let Err(e) = state.listings.reserve(body.listing_id, body.quantity) {
        return errors::listing_error_to_response(e);
    }

    match state.orders.insert(order.clone()) {
        Ok(()) => {
            tracing::info!(
                order_id = %order.id,
                listing_id = %order.listing_id,
                buyer_id = %order.buyer_id,
                quantity = order.quantity,
                "order placed"
            );
            (
                StatusCode::CREATED,
                Json(serde_json::json!({ "order": order })),
            )
                .into_response()
        }
        Err(e) => errors::order_error_to_response(e),
    }
}

pub async fn my_orders(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> axum::response::Response {
    let items = state.orders.list_by_buyer(current.user_id());
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

/// Visible to the buyer, the listing's seller, and operators. Everyone else
/// gets 404 so order ids do not leak.
pub async fn get_order(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id");
        }
    };

    let Some(order) = state.orders.get(id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found");
    };

    let visible = order.buyer_id == current.user_id()
        || order.seller_id == current.user_id()
        || current.role() == Role::Admin;
    if !visible {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found");
    }

    (StatusCode::OK, Json(serde_json::json!({ "order": order }))).into_response()
}

/// Only the buyer can cancel; the freed quantity goes back to the listing.
pub async fn cancel_order(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id");
        }
    };

    let Some(order) = state.orders.get(id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found");
    };
    if order.buyer_id != current.user_id() {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found");
    }

    match state.orders.cancel(id) {
        Ok(cancelled) => {
            if let Err(e) = state.listings.release(cancelled.listing_id, cancelled.quantity) {
                // The order is cancelled either way; an archived or deleted
                // listing simply keeps the stock off the market.
                tracing::warn!(
                    order_id = %cancelled.id,
                    listing_id = %cancelled.listing_id,
                    error = %e,
                    "could not return cancelled quantity to listing"
                );
            }
            tracing::info!(order_id = %cancelled.id, "order cancelled");
            (
                StatusCode::OK,
                Json(serde_json::json!({ "order": cancelled })),
            )
                .into_response()
        }
        Err(e) => errors::order_error_to_response(e),
    }
}
