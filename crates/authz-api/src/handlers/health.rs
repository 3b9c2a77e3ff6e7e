//! Health check handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{HealthResponse, LiveResponse};
use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        environment: state.config.app.env.clone(),
        version: state.config.app.version.clone(),
    })
}

/// GET /live
pub async fn live() -> Json<LiveResponse> {
    Json(LiveResponse {
        status: "live".to_string(),
    })
}
