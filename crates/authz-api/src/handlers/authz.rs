//! Authorization handlers: profile fetch, permission check, directory test.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use authz_auth::Credential;

use crate::dto::request::{AuthzTestRequest, PermissionCheckRequest};
use crate::dto::response::{AuthzResponse, AuthzTestResponse};
use crate::error::ApiError;
use crate::extractors::{ApiJson, ClientAddr};
use crate::state::AppState;

/// POST /authz
pub async fn authorize(
    State(state): State<AppState>,
    client: ClientAddr,
    ApiJson(credential): ApiJson<Credential>,
) -> Result<Json<AuthzResponse>, ApiError> {
    let outcome = state
        .pipeline
        .fetch_profile(&client.context(), &credential)
        .await?;

    Ok(Json(AuthzResponse {
        source: outcome.profile.cache_status.source_label().to_string(),
        effective_auth: outcome.profile.effective_auth,
    }))
}

/// POST /authz/check
///
/// 200 when granted, 403 when denied; the decision body is returned either way.
pub async fn check(
    State(state): State<AppState>,
    client: ClientAddr,
    ApiJson(request): ApiJson<PermissionCheckRequest>,
) -> Result<Response, ApiError> {
    let outcome = state
        .pipeline
        .check_permission(
            &client.context(),
            &request.credential,
            &request.module,
            &request.action,
        )
        .await?;

    let status = if outcome.decision.authorized {
        StatusCode::OK
    } else {
        StatusCode::FORBIDDEN
    };
    Ok((status, Json(outcome.decision)).into_response())
}

/// POST /authz/test
///
/// Reads the directory directly, bypassing the cache.
pub async fn directory_test(
    State(state): State<AppState>,
    client: ClientAddr,
    ApiJson(request): ApiJson<AuthzTestRequest>,
) -> Result<Json<AuthzTestResponse>, ApiError> {
    state.pipeline.admit(&client.context()).await?;

    let email = request
        .email
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| state.config.directory.sample_user_email.clone())
        .trim()
        .to_lowercase();
    let profile = state.pipeline.profiles().fetch_direct(&email).await?;

    Ok(Json(AuthzTestResponse {
        requested_email: email,
        effective_auth: profile.effective_auth,
        raw_user: profile.raw_user,
        raw_groups: profile.raw_groups,
    }))
}
