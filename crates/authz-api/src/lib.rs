//! # authz-api
//!
//! HTTP API layer for the authorization gateway built on Axum.
//!
//! Provides the probe, login, session, and authorization endpoints, the
//! extractors that read client address, cookies, and JSON bodies, CORS and
//! request logging middleware, and the `AppError` → HTTP mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
