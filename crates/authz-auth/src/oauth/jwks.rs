//! JWKS fetching and caching for ID token verification.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::DecodingKey;
use moka::future::Cache;
use serde::Deserialize;
use tracing::{debug, info, warn};

use authz_core::error::{AppError, ErrorKind, codes};
use authz_core::result::AppResult;

/// JSON Web Key Set.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwks {
    /// List of keys.
    pub keys: Vec<Jwk>,
}

/// JSON Web Key.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type (e.g., "RSA").
    pub kty: String,
    /// Key ID.
    #[serde(default)]
    pub kid: Option<String>,
    /// Key use (e.g., "sig").
    #[serde(rename = "use", default)]
    pub key_use: Option<String>,
    /// RSA modulus (base64url).
    #[serde(default)]
    pub n: Option<String>,
    /// RSA exponent (base64url).
    #[serde(default)]
    pub e: Option<String>,
}

impl Jwk {
    fn is_signing_rsa(&self) -> bool {
        self.kty == "RSA" && self.key_use.as_deref() != Some("enc")
    }

    /// Convert to a jsonwebtoken `DecodingKey`.
    pub fn to_decoding_key(&self) -> AppResult<DecodingKey> {
        let (Some(n), Some(e)) = (self.n.as_deref(), self.e.as_deref()) else {
            return Err(AppError::authentication(
                codes::INVALID_ID_TOKEN,
                "Signing key is missing RSA components",
            ));
        };
        DecodingKey::from_rsa_components(n, e).map_err(|err| {
            AppError::with_source(
                ErrorKind::Authentication,
                codes::INVALID_ID_TOKEN,
                "Signing key is not a valid RSA key",
                err,
            )
        })
    }
}

/// Caches the provider's key set for a configured TTL.
#[derive(Clone)]
pub struct JwksCache {
    http: reqwest::Client,
    jwks_url: String,
    cache: Cache<String, Arc<Jwks>>,
}

impl std::fmt::Debug for JwksCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksCache")
            .field("jwks_url", &self.jwks_url)
            .finish_non_exhaustive()
    }
}

impl JwksCache {
    /// Creates a cache for one JWKS endpoint.
    pub fn new(http: reqwest::Client, jwks_url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            http,
            jwks_url: jwks_url.into(),
            cache: Cache::builder().time_to_live(ttl).max_capacity(4).build(),
        }
    }

    /// Key for `kid`, refetching once if the cached set does not have it (key rotation).
    pub async fn key_for(&self, kid: Option<&str>) -> AppResult<DecodingKey> {
        let jwks = self.get().await?;
        if let Some(jwk) = select(&jwks, kid) {
            return jwk.to_decoding_key();
        }

        debug!(kid = ?kid, "Signing key not cached; refetching JWKS");
        self.cache.invalidate(&self.jwks_url).await;
        let jwks = self.get().await?;
        select(&jwks, kid)
            .ok_or_else(|| {
                AppError::authentication(codes::INVALID_ID_TOKEN, "Unknown ID token signing key")
            })?
            .to_decoding_key()
    }

    async fn get(&self) -> AppResult<Arc<Jwks>> {
        if let Some(jwks) = self.cache.get(&self.jwks_url).await {
            return Ok(jwks);
        }

        info!(url = %self.jwks_url, "Fetching JWKS");
        let response = self.http.get(&self.jwks_url).send().await.map_err(|e| {
            warn!(error = %e, "JWKS request failed");
            AppError::with_source(
                ErrorKind::Upstream,
                codes::WORKSPACE_UNAVAILABLE,
                "Unable to fetch signing keys",
                e,
            )
        })?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "JWKS endpoint returned an error status");
            return Err(AppError::upstream(
                codes::WORKSPACE_UNAVAILABLE,
                "Unable to fetch signing keys",
            ));
        }

        let jwks: Jwks = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Upstream,
                codes::WORKSPACE_UNAVAILABLE,
                "Signing key set is unreadable",
                e,
            )
        })?;

        let jwks = Arc::new(jwks);
        self.cache.insert(self.jwks_url.clone(), jwks.clone()).await;
        Ok(jwks)
    }
}

fn select<'a>(jwks: &'a Jwks, kid: Option<&str>) -> Option<&'a Jwk> {
    match kid {
        Some(kid) => jwks
            .keys
            .iter()
            .find(|k| k.is_signing_rsa() && k.kid.as_deref() == Some(kid)),
        None => jwks.keys.iter().find(|k| k.is_signing_rsa()),
    }
}
