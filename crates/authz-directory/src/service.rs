//! Directory fetch and normalization into `EffectiveAuth`.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use authz_core::models::{DirectoryProfile, EffectiveAuth};
use authz_core::result::AppResult;
use authz_core::traits::directory::DirectoryClient;

use crate::normalizer::PermissionNormalizer;

/// Produces normalized profiles from the directory. Performs no caching.
#[derive(Clone)]
pub struct DirectoryAuthService {
    client: Arc<dyn DirectoryClient>,
    normalizer: PermissionNormalizer,
}

impl std::fmt::Debug for DirectoryAuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryAuthService")
            .field("normalizer", &self.normalizer)
            .finish_non_exhaustive()
    }
}

impl DirectoryAuthService {
    /// Creates the service over a directory client and custom schema name.
    pub fn new(client: Arc<dyn DirectoryClient>, schema_name: impl Into<String>) -> Self {
        Self {
            client,
            normalizer: PermissionNormalizer::new(schema_name),
        }
    }

    /// Fetch the user and their groups, then normalize.
    ///
    /// The canonical email is the directory's `primaryEmail` when present.
    pub async fn fetch_effective_auth(&self, email: &str) -> AppResult<DirectoryProfile> {
        let requested = email.trim().to_lowercase();
        let raw_user = self.client.get_user(&requested).await?;
        let raw_groups = self.client.list_groups(&requested).await?;

        let effective_auth = self.build(&requested, &raw_user, &raw_groups);
        debug!(
            email = %effective_auth.email,
            permissions = effective_auth.permissions.len(),
            groups = effective_auth.groups.len(),
            "Normalized directory profile"
        );

        Ok(DirectoryProfile {
            effective_auth,
            raw_user,
            raw_groups,
        })
    }

    fn build(&self, requested: &str, raw_user: &Value, raw_groups: &Value) -> EffectiveAuth {
        let schema = self.normalizer.normalize_user(raw_user);
        let email = raw_user
            .get("primaryEmail")
            .and_then(Value::as_str)
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| requested.to_string());

        EffectiveAuth {
            email,
            home_department: schema.home_department,
            is_department_manager: schema.is_department_manager,
            functions: schema.functions,
            permissions: schema.permissions,
            groups: group_emails(raw_groups),
            fetched_at: Utc::now(),
        }
    }
}

fn group_emails(raw_groups: &Value) -> Vec<String> {
    raw_groups
        .get("groups")
        .and_then(Value::as_array)
        .map(|groups| {
            groups
                .iter()
                .filter_map(|g| g.get("email").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
