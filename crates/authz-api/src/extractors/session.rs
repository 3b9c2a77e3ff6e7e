//! `SessionCookie` extractor: the raw session token, if the cookie is present.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

use crate::state::AppState;

/// Raw value of the session cookie. Decoding is left to the pipeline so
/// that guards run first.
#[derive(Debug, Clone, Default)]
pub struct SessionCookie(pub Option<String>);

impl SessionCookie {
    /// The token, when present and non-empty.
    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl FromRequestParts<AppState> for SessionCookie {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(state.session_cookie_name())
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty());
        Ok(Self(token))
    }
}
