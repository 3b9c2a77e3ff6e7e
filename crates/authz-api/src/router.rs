//! Route definitions for the gateway HTTP API.
//!
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes and request logging.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(login_routes())
        .merge(session_routes())
        .merge(authz_routes())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Liveness and health probes
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/live", get(handlers::health::live))
}

/// Browser OAuth login
fn login_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(handlers::auth::login))
        .route("/auth/callback", get(handlers::auth::callback))
        .route("/logout", post(handlers::auth::logout))
}

/// Session-cookie endpoints
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::session::me))
        .route("/session", get(handlers::session::session))
        .route("/session/refresh", post(handlers::session::refresh))
}

/// Credential-based authorization endpoints
fn authz_routes() -> Router<AppState> {
    Router::new()
        .route("/authz", post(handlers::authz::authorize))
        .route("/authz/check", post(handlers::authz::check))
        .route("/authz/test", post(handlers::authz::directory_test))
}
