//! Response DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use authz_core::models::{CacheStatus, EffectiveAuth, InternalSession};

/// `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok`.
    pub status: String,
    /// Deployment environment.
    pub environment: String,
    /// Application version.
    pub version: String,
}

/// `GET /live`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveResponse {
    /// Always `live`.
    pub status: String,
}

/// `POST /authz/test`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthzTestResponse {
    /// The email that was looked up.
    pub requested_email: String,
    /// Normalized profile.
    pub effective_auth: EffectiveAuth,
    /// Raw directory user record.
    pub raw_user: Value,
    /// Raw group listing.
    pub raw_groups: Value,
}

/// `POST /authz`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthzResponse {
    /// The caller's profile.
    pub effective_auth: EffectiveAuth,
    /// `cache` or `refreshed`.
    pub source: String,
}

/// `GET /me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    /// The caller's profile.
    pub effective_auth: EffectiveAuth,
    /// How the profile was obtained.
    pub cache_status: CacheStatus,
}

/// Session timing exposed to the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Issue time, seconds since epoch.
    pub issued_at: i64,
    /// Expiry time, seconds since epoch.
    pub expires_at: i64,
    /// Whether the client should call `/session/refresh`.
    pub requires_refresh: bool,
}

impl SessionMetadata {
    /// Metadata for a decoded session.
    pub fn new(session: &InternalSession, requires_refresh: bool) -> Self {
        Self {
            issued_at: session.issued_at,
            expires_at: session.expires_at,
            requires_refresh,
        }
    }
}

/// `GET /session` and `POST /session/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// The caller's profile.
    pub effective_auth: EffectiveAuth,
    /// How the profile was obtained.
    pub cache_status: CacheStatus,
    /// Session timing.
    pub session: SessionMetadata,
}
