//! Directory collaborator configuration.

use serde::{Deserialize, Serialize};

/// Google Workspace Directory API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Path to the service account JSON key file.
    #[serde(default = "default_service_account_file")]
    pub service_account_file: String,
    /// Workspace administrator impersonated through domain-wide delegation.
    #[serde(default)]
    pub delegated_user: Option<String>,
    /// Custom schema holding department, manager flag, and functions.
    #[serde(default = "default_auth_schema")]
    pub auth_schema: String,
    /// Scopes requested on top of the read-only directory scopes.
    #[serde(default)]
    pub additional_scopes: Vec<String>,
    /// Upstream request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Email used by `/authz/test` when the body omits one.
    #[serde(default = "default_sample_user_email")]
    pub sample_user_email: String,
    /// Lower bound of the jittered retry backoff, in milliseconds.
    #[serde(default = "default_backoff_min")]
    pub retry_backoff_min_ms: u64,
    /// Upper bound of the jittered retry backoff, in milliseconds.
    #[serde(default = "default_backoff_max")]
    pub retry_backoff_max_ms: u64,
    /// Directory API base URL.
    #[serde(default = "default_api_base")]
    pub api_base_url: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            service_account_file: default_service_account_file(),
            delegated_user: None,
            auth_schema: default_auth_schema(),
            additional_scopes: Vec::new(),
            request_timeout_seconds: default_request_timeout(),
            sample_user_email: default_sample_user_email(),
            retry_backoff_min_ms: default_backoff_min(),
            retry_backoff_max_ms: default_backoff_max(),
            api_base_url: default_api_base(),
        }
    }
}

fn default_service_account_file() -> String {
    "private/service-account.json".to_string()
}

fn default_auth_schema() -> String {
    "Authorization".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_sample_user_email() -> String {
    "sample.user@example.com".to_string()
}

fn default_backoff_min() -> u64 {
    100
}

fn default_backoff_max() -> u64 {
    400
}

fn default_api_base() -> String {
    "https://admin.googleapis.com/admin/directory/v1".to_string()
}
