//! Session-cookie handlers: me, session, session refresh.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::{ORIGIN, SET_COOKIE};
use axum::response::{AppendHeaders, IntoResponse, Response};
use tracing::{info, warn};

use authz_core::error::{AppError, codes};
use authz_core::result::AppResult;

use crate::dto::response::{MeResponse, SessionMetadata, SessionResponse};
use crate::error::ApiError;
use crate::extractors::{ClientAddr, SessionCookie};
use crate::state::AppState;

/// GET /me
pub async fn me(
    State(state): State<AppState>,
    client: ClientAddr,
    session: SessionCookie,
) -> Result<Json<MeResponse>, ApiError> {
    let (_, outcome) = state
        .pipeline
        .session_profile(&client.context(), session.token(), false)
        .await?;

    Ok(Json(MeResponse {
        effective_auth: outcome.profile.effective_auth,
        cache_status: outcome.profile.cache_status,
    }))
}

/// GET /session
pub async fn session(
    State(state): State<AppState>,
    client: ClientAddr,
    cookie: SessionCookie,
) -> Result<Json<SessionResponse>, ApiError> {
    let (session, outcome) = state
        .pipeline
        .session_profile(&client.context(), cookie.token(), false)
        .await?;
    let requires_refresh = state.sessions().requires_refresh(&session);

    Ok(Json(SessionResponse {
        effective_auth: outcome.profile.effective_auth,
        cache_status: outcome.profile.cache_status,
        session: SessionMetadata::new(&session, requires_refresh),
    }))
}

/// POST /session/refresh
///
/// Forces a directory re-fetch and re-issues the session with a new id and expiry.
pub async fn refresh(
    State(state): State<AppState>,
    client: ClientAddr,
    cookie: SessionCookie,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    check_origin(&state, &headers)?;

    let (session, outcome) = state
        .pipeline
        .session_profile(&client.context(), cookie.token(), true)
        .await?;

    let renewed = state.sessions().reissue(&session);
    let token = state.sessions().encode(&renewed)?;
    info!(email = %renewed.email, "Session refreshed");

    let set_cookie = state.cookies.set_cookie(
        state.session_cookie_name(),
        &token,
        state.sessions().ttl_seconds().max(0) as u64,
    );
    let body = SessionResponse {
        effective_auth: outcome.profile.effective_auth,
        cache_status: outcome.profile.cache_status,
        session: SessionMetadata::new(&renewed, false),
    };
    Ok((AppendHeaders([(SET_COOKIE, set_cookie)]), Json(body)).into_response())
}

/// When CORS origins are configured, state-changing session calls must come from one of them.
fn check_origin(state: &AppState, headers: &HeaderMap) -> AppResult<()> {
    let allowed = &state.config.server.cors.allowed_origins;
    if allowed.is_empty() || allowed.iter().any(|o| o == "*") {
        return Ok(());
    }

    let origin = headers
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(|o| o.trim_end_matches('/'));
    match origin {
        Some(origin) if allowed.iter().any(|o| o.trim_end_matches('/') == origin) => Ok(()),
        other => {
            warn!(origin = ?other, "Session refresh from disallowed origin");
            Err(AppError::authorization(
                codes::ORIGIN_NOT_ALLOWED,
                "Origin not allowed",
            ))
        }
    }
}
