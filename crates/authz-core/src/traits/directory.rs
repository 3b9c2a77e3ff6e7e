//! Directory collaborator contract.

use async_trait::async_trait;

use crate::result::AppResult;

/// Source of truth for user records and group memberships.
///
/// Payloads are returned raw; normalization happens elsewhere. Failures
/// should be reported as upstream errors without leaking transport detail.
#[async_trait]
pub trait DirectoryClient: Send + Sync + 'static {
    /// Fetch the full user record including the configured custom schema.
    async fn get_user(&self, email: &str) -> AppResult<serde_json::Value>;

    /// List every group the user belongs to as `{"groups": [...]}`.
    async fn list_groups(&self, email: &str) -> AppResult<serde_json::Value>;
}
