use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use pluribus_catalog::ListingStoreError;
use pluribus_core::DomainError;
use pluribus_orders::OrderStoreError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Unauthorized => json_error(StatusCode::FORBIDDEN, "unauthorized", "unauthorized"),
    }
}

pub fn listing_error_to_response(err: ListingStoreError) -> axum::response::Response {
    match err {
        ListingStoreError::NotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", "listing not found")
        }
        ListingStoreError::Archived => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "listing_archived",
            "listing is no longer available",
        ),
        ListingStoreError::InsufficientQuantity {
            available,
            requested,
        } => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "insufficient_quantity",
            format!("requested {requested} but only {available} available"),
        ),
        ListingStoreError::Duplicate => {
            json_error(StatusCode::CONFLICT, "conflict", "listing already exists")
        }
    }
}

pub fn order_error_to_response(err: OrderStoreError) -> axum::response::Response {
    match err {
        OrderStoreError::NotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", "order not found")
        }
        OrderStoreError::AlreadyCancelled => json_error(
            StatusCode::CONFLICT,
            "conflict",
            "order is already cancelled",
        ),
        OrderStoreError::Duplicate => {
            json_error(StatusCode::CONFLICT, "conflict", "order already exists")
        }
    }
}
