//! Google OAuth 2.0 / OpenID Connect collaborator.
//!
//! Builds the authorization URL, exchanges authorization codes, verifies ID
//! tokens against the cached JWKS, and introspects access tokens.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, Validation, decode, decode_header};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use authz_core::config::OAuthConfig;
use authz_core::error::{AppError, ErrorKind, codes};
use authz_core::result::AppResult;
use authz_core::traits::token::{IdTokenClaims, TokenInfo, TokenVerifier, UserInfo};

use super::flow::AuthorizationCodeFlow;
use super::jwks::JwksCache;
use super::state::OAuthState;

/// Scopes requested at login.
const LOGIN_SCOPES: &str = "openid email profile";

/// Tokens returned by the code exchange.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodeExchange {
    /// Signed ID token.
    #[serde(default)]
    pub id_token: Option<String>,
    /// Access token.
    #[serde(default)]
    pub access_token: Option<String>,
}

/// HTTP client for Google's OAuth endpoints.
#[derive(Debug, Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    config: OAuthConfig,
    audiences: Vec<String>,
    jwks: JwksCache,
}

impl GoogleOAuthClient {
    /// Build the client; `timeout_seconds` bounds every upstream call.
    pub fn from_config(config: &OAuthConfig, timeout_seconds: u64) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds.max(1)))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    codes::CONFIGURATION_ERROR,
                    "Failed to build OAuth HTTP client",
                    e,
                )
            })?;

        let jwks = JwksCache::new(
            http.clone(),
            config.jwks_url.clone(),
            Duration::from_secs(config.jwks_cache_ttl_seconds.max(1)),
        );

        Ok(Self {
            http,
            audiences: config.allowed_audiences(),
            config: config.clone(),
            jwks,
        })
    }
}

#[async_trait]
impl AuthorizationCodeFlow for GoogleOAuthClient {
    /// Authorization URL for one login attempt.
    fn authorization_url(&self, state: &OAuthState) -> AppResult<String> {
        let mut params = vec![
            ("response_type", "code"),
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("scope", LOGIN_SCOPES),
            ("access_type", "offline"),
            ("include_granted_scopes", "true"),
            ("prompt", "consent"),
            ("state", state.state.as_str()),
            ("nonce", state.nonce.as_str()),
        ];
        if let Some(domain) = self.config.allowed_hosted_domain.as_deref() {
            params.push(("hd", domain));
        }

        Url::parse_with_params(&self.config.auth_url, &params)
            .map(String::from)
            .map_err(|e| AppError::configuration(format!("oauth.auth_url is not a valid URL: {e}")))
    }

    /// Exchange an authorization code at the token endpoint.
    async fn exchange_code(&self, code: &str) -> AppResult<CodeExchange> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| upstream("Token endpoint request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Authorization code exchange rejected");
            return Err(AppError::validation(
                codes::INVALID_REQUEST,
                "Authorization code could not be exchanged",
            ));
        }

        response
            .json::<CodeExchange>()
            .await
            .map_err(|e| upstream("Token endpoint returned an unreadable body", e))
    }
}

#[async_trait]
impl TokenVerifier for GoogleOAuthClient {
    async fn verify_id_token(&self, raw: &str) -> AppResult<IdTokenClaims> {
        let header = decode_header(raw).map_err(|e| {
            debug!(error = %e, "ID token header unreadable");
            invalid_id_token()
        })?;
        let key = self.jwks.key_for(header.kid.as_deref()).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&self.audiences);
        validation.set_issuer(&self.config.issuers);

        decode::<IdTokenClaims>(raw, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "ID token rejected");
                invalid_id_token()
            })
    }

    async fn introspect_access_token(&self, token: &str) -> AppResult<TokenInfo> {
        let url = Url::parse_with_params(&self.config.tokeninfo_url, &[("access_token", token)])
            .map_err(|e| {
                AppError::configuration(format!("oauth.tokeninfo_url is not a valid URL: {e}"))
            })?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| upstream("Token introspection request failed", e))?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "Access token introspection rejected");
            return Err(invalid_access_token());
        }
        response.json::<TokenInfo>().await.map_err(|e| {
            debug!(error = %e, "Token introspection body unreadable");
            invalid_access_token()
        })
    }

    async fn fetch_user_info(&self, token: &str) -> AppResult<UserInfo> {
        let response = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| upstream("User-info request failed", e))?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "User-info request rejected");
            return Err(invalid_access_token());
        }
        response.json::<UserInfo>().await.map_err(|e| {
            debug!(error = %e, "User-info body unreadable");
            invalid_access_token()
        })
    }
}

fn invalid_id_token() -> AppError {
    AppError::authentication(codes::INVALID_ID_TOKEN, "Invalid ID token")
}

fn invalid_access_token() -> AppError {
    AppError::authentication(codes::INVALID_ACCESS_TOKEN, "Invalid access token")
}

fn upstream(message: &str, err: reqwest::Error) -> AppError {
    warn!(error = %err, "{message}");
    AppError::with_source(
        ErrorKind::Upstream,
        codes::WORKSPACE_UNAVAILABLE,
        message.to_string(),
        err,
    )
}
