//! Service-account access tokens via the JWT bearer grant.
//!
//! The service account signs an RS256 assertion naming the delegated
//! administrator as `sub`; the token endpoint exchanges it for a short-lived
//! bearer token which is cached until shortly before it expires.

use std::path::Path;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use authz_core::error::{AppError, ErrorKind, codes};
use authz_core::result::AppResult;

/// Read-only scopes the directory client always requests.
pub const DIRECTORY_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/admin.directory.user.readonly",
    "https://www.googleapis.com/auth/admin.directory.group.readonly",
];

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertion lifetime accepted by the token endpoint.
const ASSERTION_LIFETIME_SECONDS: i64 = 3600;

/// Tokens this close to expiry are treated as expired.
const TOKEN_EXPIRY_SKEW_SECONDS: i64 = 60;

/// The fields of a service-account JSON key file that the grant needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Service account email, used as the assertion issuer.
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// Token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccountKey {
    /// Load and parse a key file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                codes::CONFIGURATION_ERROR,
                format!("Cannot read service account file '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json(&raw)
    }

    /// Parse a key from its JSON text.
    pub fn from_json(raw: &str) -> AppResult<Self> {
        serde_json::from_str(raw).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                codes::CONFIGURATION_ERROR,
                "Service account file is not a valid key",
                e,
            )
        })
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: chrono::DateTime<Utc>,
}

/// Issues and caches delegated access tokens.
pub struct ServiceAccountTokenSource {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    delegated_user: String,
    scopes: Vec<String>,
    http: reqwest::Client,
    cached: RwLock<Option<CachedToken>>,
}

impl std::fmt::Debug for ServiceAccountTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountTokenSource")
            .field("client_email", &self.key.client_email)
            .field("delegated_user", &self.delegated_user)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountTokenSource {
    /// Build a token source; fails if the private key is not valid PEM.
    pub fn new(
        key: ServiceAccountKey,
        delegated_user: impl Into<String>,
        additional_scopes: &[String],
        http: reqwest::Client,
    ) -> AppResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                codes::CONFIGURATION_ERROR,
                "Service account private key is not valid RSA PEM",
                e,
            )
        })?;

        let mut scopes: Vec<String> = DIRECTORY_SCOPES.iter().map(|s| s.to_string()).collect();
        for scope in additional_scopes {
            let scope = scope.trim();
            if !scope.is_empty() && !scopes.iter().any(|s| s == scope) {
                scopes.push(scope.to_string());
            }
        }

        Ok(Self {
            key,
            encoding_key,
            delegated_user: delegated_user.into(),
            scopes,
            http,
            cached: RwLock::new(None),
        })
    }

    /// Scopes included in every assertion.
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// A valid bearer token, fetching a new one when the cached token is near expiry.
    pub async fn access_token(&self) -> AppResult<String> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref()
                && token.expires_at - Duration::seconds(TOKEN_EXPIRY_SKEW_SECONDS) > Utc::now()
            {
                return Ok(token.value.clone());
            }
        }

        // The lock is released during the exchange; concurrent callers may
        // each fetch a token and the last write wins.
        let fresh = self.exchange().await?;
        let value = fresh.value.clone();
        *self.cached.write().await = Some(fresh);
        Ok(value)
    }

    fn signed_assertion(&self) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            sub: &self.delegated_user,
            scope: self.scopes.join(" "),
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECONDS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign service account assertion: {e}")))
    }

    async fn exchange(&self) -> AppResult<CachedToken> {
        let assertion = self.signed_assertion()?;
        debug!(subject = %self.delegated_user, "Requesting delegated directory token");

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Service account token request failed");
                AppError::with_source(
                    ErrorKind::Upstream,
                    codes::WORKSPACE_UNAVAILABLE,
                    "Service account token request failed",
                    e,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Service account token endpoint rejected the assertion");
            return Err(AppError::upstream(
                codes::WORKSPACE_UNAVAILABLE,
                format!("Token endpoint returned {status}"),
            ));
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Upstream,
                codes::WORKSPACE_UNAVAILABLE,
                "Token endpoint returned an unreadable body",
                e,
            )
        })?;

        Ok(CachedToken {
            value: body.access_token,
            expires_at: Utc::now() + Duration::seconds(body.expires_in.max(0)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parse_defaults_token_uri() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"svc@project.iam.gserviceaccount.com","private_key":"x"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
        assert!(!format!("{key:?}").contains("private_key"));
    }

    #[test]
    fn test_invalid_key_json_is_configuration_error() {
        let err = ServiceAccountKey::from_json("{").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_invalid_pem_is_rejected() {
        let key = ServiceAccountKey {
            client_email: "svc@example.com".into(),
            private_key: "not a pem".into(),
            token_uri: default_token_uri(),
        };
        let err = ServiceAccountTokenSource::new(key, "admin@example.com", &[], reqwest::Client::new())
            .unwrap_err();
        assert_eq!(err.code, codes::CONFIGURATION_ERROR);
    }
}
