//! Internal session configuration.

use serde::{Deserialize, Serialize};

/// Signed internal session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// HMAC secret for session tokens and the OAuth state cookie.
    #[serde(default)]
    pub signing_secret: String,
    /// Session cookie name.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Session lifetime in seconds.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Remaining lifetime at or below which callers should re-issue.
    #[serde(default = "default_refresh_threshold")]
    pub refresh_threshold_seconds: u64,
    /// Force the `Secure` attribute on or off. Derived from the environment when unset.
    #[serde(default)]
    pub cookie_secure: Option<bool>,
    /// Requested `SameSite` policy: `lax`, `strict`, or `none`.
    #[serde(default = "default_samesite")]
    pub cookie_samesite: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            signing_secret: String::new(),
            cookie_name: default_cookie_name(),
            ttl_seconds: default_ttl(),
            refresh_threshold_seconds: default_refresh_threshold(),
            cookie_secure: None,
            cookie_samesite: default_samesite(),
        }
    }
}

fn default_cookie_name() -> String {
    "ga_session".to_string()
}

fn default_ttl() -> u64 {
    3600
}

fn default_refresh_threshold() -> u64 {
    300
}

fn default_samesite() -> String {
    "lax".to_string()
}
