use axum::{
    Router,
    routing::{get, post},
};

pub mod admin;
pub mod auth;
pub mod listings;
pub mod orders;
pub mod system;

/// Routes reachable without a token: account entry points and the
/// public storefront catalog.
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/listings", get(listings::list_active))
        .route("/listings/:id", get(listings::get_listing))
}

/// Routes behind the bearer middleware. The seller console lives under
/// `/seller`, the operator console under `/admin`.
pub fn protected_router() -> Router {
    Router::new()
        .route("/auth/me", get(auth::me))
        .nest("/seller", listings::seller_router())
        .nest("/orders", orders::router())
        .nest("/admin", admin::router())
}
