//! Route handlers and router assembly

/// Registration, login and current-user handlers
pub mod auth;

/// Health check
pub mod health;

/// Image upload protocol handlers
pub mod images;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};

use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

/// Creates the router with all handler routes
pub fn handler(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(health::handler))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/images/upload-url", post(images::create_upload_url))
        .route("/api/images/confirm", post(images::confirm_upload))
        .route("/api/images", get(images::list_images))
        .route(
            "/api/images/{id}",
            get(images::get_image).delete(images::delete_image),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    public_routes.merge(protected_routes).with_state(state)
}
