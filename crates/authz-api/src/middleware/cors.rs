//! CORS layer configuration.

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use authz_core::config::CorsConfig;

/// Builds a CORS tower layer from configuration.
///
/// Explicit origins get credentialed CORS so the session cookie travels;
/// `*` allows any origin without credentials. No origins disables CORS.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    if config.allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| o.trim_end_matches('/').parse().ok())
        .collect();
    if origins.is_empty() {
        return CorsLayer::new();
    }

    layer.allow_origin(origins).allow_credentials(true)
}
