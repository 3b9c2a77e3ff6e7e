//! Network admission and rate limiting configuration.

use serde::{Deserialize, Serialize};

/// Gates applied to every privileged request before identity resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Admission ruleset: hosts, CIDR blocks, `a|b` ranges, or `*`.
    #[serde(default = "default_allowed_networks")]
    pub allowed_networks: Vec<String>,
    /// Requests allowed per key within the window.
    #[serde(default = "default_rate_limit_requests")]
    pub rate_limit_requests: u32,
    /// Window length in seconds.
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_seconds: u64,
    /// Rate limiter backend: `"memory"` or `"redis"`.
    #[serde(default = "default_backend")]
    pub rate_limit_backend: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            allowed_networks: default_allowed_networks(),
            rate_limit_requests: default_rate_limit_requests(),
            rate_limit_window_seconds: default_rate_limit_window(),
            rate_limit_backend: default_backend(),
        }
    }
}

fn default_allowed_networks() -> Vec<String> {
    vec!["0.0.0.0/0".to_string()]
}

fn default_rate_limit_requests() -> u32 {
    60
}

fn default_rate_limit_window() -> u64 {
    60
}

fn default_backend() -> String {
    "memory".to_string()
}
