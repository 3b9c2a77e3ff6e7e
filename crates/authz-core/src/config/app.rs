//! Deployment identity, server, and CORS configuration.

use serde::{Deserialize, Serialize};

/// Deployment identity reported by `/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfo {
    /// Deployment environment (`local`, `development`, `staging`, `production`).
    #[serde(default = "default_env")]
    pub env: String,
    /// Application name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Reported version.
    #[serde(default = "default_version")]
    pub version: String,
}

impl AppInfo {
    /// Local and development deployments relax cookie security.
    pub fn is_local(&self) -> bool {
        matches!(self.env.as_str(), "local" | "development")
    }
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            env: default_env(),
            name: default_name(),
            version: default_version(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Take the client address from the first `X-Forwarded-For` hop.
    ///
    /// Only enable behind a proxy that overwrites the header.
    #[serde(default)]
    pub trust_forwarded_for: bool,
    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            trust_forwarded_for: false,
            shutdown_grace_seconds: default_shutdown_grace(),
            cors: CorsConfig::default(),
        }
    }
}

/// CORS configuration. Also the allow-list for `Origin` on session refresh.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. Empty disables cross-origin access entirely.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_env() -> String {
    "local".to_string()
}

fn default_name() -> String {
    "google-authz".to_string()
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_shutdown_grace() -> u64 {
    30
}
