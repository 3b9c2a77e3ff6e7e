//! Browser login handlers: login redirect, OAuth callback, logout.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};

use authz_auth::oauth::state::state_mismatch;
use authz_core::error::{AppError, codes};

use crate::dto::request::CallbackQuery;
use crate::error::ApiError;
use crate::extractors::SessionCookie;
use crate::state::AppState;

/// GET /login
///
/// Redirects to the provider and pins the login attempt to a signed
/// state/nonce cookie.
pub async fn login(State(state): State<AppState>) -> Result<Response, ApiError> {
    let attempt = state.oauth_state.generate();
    let cookie_value = state.oauth_state.encode(&attempt)?;
    let url = state.oauth.authorization_url(&attempt)?;

    let cookie = state.cookies.set_cookie(
        &state.config.oauth.state_cookie_name,
        &cookie_value,
        state.oauth_state.ttl_seconds(),
    );
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to(&url)).into_response())
}

/// GET /auth/callback
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let state_cookie = &state.config.oauth.state_cookie_name;
    let expected = jar
        .get(state_cookie)
        .map(|c| c.value().to_string())
        .ok_or_else(state_mismatch)?;
    let expected = state.oauth_state.decode(&expected)?;

    if query.state.as_deref() != Some(expected.state.as_str()) {
        warn!("OAuth callback state does not match the state cookie");
        return Err(state_mismatch().into());
    }

    let code = query
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::validation(codes::INVALID_REQUEST, "Missing authorization code"))?;

    let tokens = state.oauth.exchange_code(&code).await?;
    let id_token = tokens
        .id_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::validation(codes::MISSING_CLAIMS, "Token response did not include an ID token")
        })?;

    let (identity, claims) = state
        .pipeline
        .identity()
        .resolve_login(&id_token, &expected)
        .await?;
    let profile = state.pipeline.profiles().resolve(&identity).await?;

    let session = state
        .sessions()
        .create_session(&claims.sub, &identity.email, &identity.cache_key);
    let token = state.sessions().encode(&session)?;

    info!(
        email = %identity.email,
        cache_status = %profile.cache_status,
        permissions = profile.effective_auth.permissions.len(),
        "Login completed"
    );

    let session_cookie = state.cookies.set_cookie(
        state.session_cookie_name(),
        &token,
        state.sessions().ttl_seconds().max(0) as u64,
    );
    let cleared = state.cookies.clear_cookie(state_cookie);

    Ok((
        AppendHeaders([(SET_COOKIE, session_cookie), (SET_COOKIE, cleared)]),
        Redirect::to(&state.config.oauth.post_login_redirect_url),
    )
        .into_response())
}

/// POST /logout
///
/// Cache invalidation is best-effort; the cookie is cleared regardless.
pub async fn logout(State(state): State<AppState>, session: SessionCookie) -> Response {
    if let Some(token) = session.token()
        && let Ok((identity, _)) = state.pipeline.identity().resolve_session(token)
    {
        state.pipeline.profiles().invalidate(&identity.cache_key).await;
        info!(email = %identity.email, "Session logged out");
    }

    let cleared = state.cookies.clear_cookie(state.session_cookie_name());
    (StatusCode::NO_CONTENT, AppendHeaders([(SET_COOKIE, cleared)])).into_response()
}
