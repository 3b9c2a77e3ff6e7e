//! OAuth client and token verification configuration.

use serde::{Deserialize, Serialize};

/// OAuth client registration plus the upstream endpoints used to verify tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// OAuth client id; also the primary accepted ID token audience.
    #[serde(default)]
    pub client_id: String,
    /// OAuth client secret.
    #[serde(default)]
    pub client_secret: String,
    /// Redirect URI registered for the authorization-code flow.
    #[serde(default)]
    pub redirect_uri: String,
    /// Hosted domain every identity must belong to, when set.
    #[serde(default)]
    pub allowed_hosted_domain: Option<String>,
    /// Audiences trusted in addition to `client_id`.
    #[serde(default)]
    pub additional_audiences: Vec<String>,
    /// Where the callback redirects after a successful login.
    #[serde(default = "default_post_login_redirect")]
    pub post_login_redirect_url: String,
    /// Name of the signed state/nonce cookie.
    #[serde(default = "default_state_cookie_name")]
    pub state_cookie_name: String,
    /// Lifetime of the state/nonce cookie in seconds.
    #[serde(default = "default_state_ttl")]
    pub state_ttl_seconds: u64,
    /// Authorization endpoint.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Token endpoint.
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Token introspection endpoint for access tokens.
    #[serde(default = "default_tokeninfo_url")]
    pub tokeninfo_url: String,
    /// User-info endpoint.
    #[serde(default = "default_userinfo_url")]
    pub userinfo_url: String,
    /// JWKS endpoint for ID token signatures.
    #[serde(default = "default_jwks_url")]
    pub jwks_url: String,
    /// Accepted ID token issuers.
    #[serde(default = "default_issuers")]
    pub issuers: Vec<String>,
    /// JWKS cache lifetime in seconds.
    #[serde(default = "default_jwks_ttl")]
    pub jwks_cache_ttl_seconds: u64,
}

impl OAuthConfig {
    /// Client id plus every additional trusted audience.
    pub fn allowed_audiences(&self) -> Vec<String> {
        let mut audiences = Vec::with_capacity(1 + self.additional_audiences.len());
        if !self.client_id.is_empty() {
            audiences.push(self.client_id.clone());
        }
        for aud in &self.additional_audiences {
            let aud = aud.trim();
            if !aud.is_empty() && !audiences.iter().any(|a| a == aud) {
                audiences.push(aud.to_string());
            }
        }
        audiences
    }
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            allowed_hosted_domain: None,
            additional_audiences: Vec::new(),
            post_login_redirect_url: default_post_login_redirect(),
            state_cookie_name: default_state_cookie_name(),
            state_ttl_seconds: default_state_ttl(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            tokeninfo_url: default_tokeninfo_url(),
            userinfo_url: default_userinfo_url(),
            jwks_url: default_jwks_url(),
            issuers: default_issuers(),
            jwks_cache_ttl_seconds: default_jwks_ttl(),
        }
    }
}

fn default_post_login_redirect() -> String {
    "/me".to_string()
}

fn default_state_cookie_name() -> String {
    "ga_oauth_state".to_string()
}

fn default_state_ttl() -> u64 {
    600
}

fn default_auth_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_tokeninfo_url() -> String {
    "https://oauth2.googleapis.com/tokeninfo".to_string()
}

fn default_userinfo_url() -> String {
    "https://openidconnect.googleapis.com/v1/userinfo".to_string()
}

fn default_jwks_url() -> String {
    "https://www.googleapis.com/oauth2/v3/certs".to_string()
}

fn default_issuers() -> Vec<String> {
    vec![
        "accounts.google.com".to_string(),
        "https://accounts.google.com".to_string(),
    ]
}

fn default_jwks_ttl() -> u64 {
    300
}
