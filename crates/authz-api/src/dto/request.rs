//! Request DTOs.

use serde::Deserialize;

use authz_auth::Credential;

/// `POST /authz/test` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthzTestRequest {
    /// Email to look up; the configured sample user when absent.
    #[serde(default)]
    pub email: Option<String>,
}

/// `POST /authz/check` body: one credential plus the permission to test.
#[derive(Debug, Clone, Deserialize)]
pub struct PermissionCheckRequest {
    /// Exactly one caller credential.
    #[serde(flatten)]
    pub credential: Credential,
    /// Module name, slugified before evaluation.
    pub module: String,
    /// RBAC verb.
    pub action: String,
}

/// `GET /auth/callback` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code.
    #[serde(default)]
    pub code: Option<String>,
    /// State echoed by the provider.
    #[serde(default)]
    pub state: Option<String>,
}
