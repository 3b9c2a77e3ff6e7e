//! The normalized authorization profile and its cache envelope.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized authorization profile for one identity.
///
/// `permissions` is derived solely from `functions`; the `BTreeSet` keeps it
/// deduplicated and serializes it sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveAuth {
    /// Canonical lowercase email.
    pub email: String,
    /// Department from the directory custom schema.
    #[serde(default)]
    pub home_department: Option<String>,
    /// Whether the user manages their department.
    #[serde(default)]
    pub is_department_manager: bool,
    /// Raw function strings, order preserved.
    #[serde(default)]
    pub functions: Vec<String>,
    /// Derived `module:action` permission strings.
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    /// Group email addresses.
    #[serde(default)]
    pub groups: Vec<String>,
    /// When the profile was fetched from the directory.
    pub fetched_at: DateTime<Utc>,
}

impl EffectiveAuth {
    /// Whether the exact permission string is held.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Sorted permissions sharing the `module:` prefix.
    pub fn permissions_for_module(&self, module: &str) -> Vec<String> {
        let prefix = format!("{module}:");
        self.permissions
            .iter()
            .filter(|p| p.starts_with(&prefix))
            .cloned()
            .collect()
    }
}

/// Raw directory payloads kept alongside a freshly normalized profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryProfile {
    /// The normalized profile.
    pub effective_auth: EffectiveAuth,
    /// The raw user record.
    pub raw_user: serde_json::Value,
    /// The raw group membership listing.
    pub raw_groups: serde_json::Value,
}

/// A cached profile with its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// The cached profile.
    pub effective_auth: EffectiveAuth,
    /// Absolute expiry instant.
    pub expires_at: DateTime<Utc>,
}

impl CacheRecord {
    /// Build a record expiring `ttl_seconds` from now.
    pub fn new(effective_auth: EffectiveAuth, ttl_seconds: u64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(ttl_seconds as i64);
        Self {
            effective_auth,
            expires_at,
        }
    }

    /// `max(0, expires_at - now)`.
    pub fn ttl_remaining(&self) -> chrono::Duration {
        self.ttl_remaining_at(Utc::now())
    }

    /// Remaining lifetime measured against an explicit instant.
    pub fn ttl_remaining_at(&self, now: DateTime<Utc>) -> chrono::Duration {
        (self.expires_at - now).max(chrono::Duration::zero())
    }

    /// Whether the record is expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// How a profile request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// Served from cache with remaining TTL above the warm threshold.
    CacheHit,
    /// A stale hit that was re-fetched synchronously.
    CacheRefresh,
    /// Nothing cached; fetched and stored.
    CacheMiss,
}

impl CacheStatus {
    /// Coarse source label: `cache` for a hit, `refreshed` otherwise.
    pub fn source_label(&self) -> &'static str {
        match self {
            Self::CacheHit => "cache",
            Self::CacheRefresh | Self::CacheMiss => "refreshed",
        }
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CacheHit => write!(f, "cache_hit"),
            Self::CacheRefresh => write!(f, "cache_refresh"),
            Self::CacheMiss => write!(f, "cache_miss"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(perms: &[&str]) -> EffectiveAuth {
        EffectiveAuth {
            email: "a@example.com".into(),
            home_department: None,
            is_department_manager: false,
            functions: Vec::new(),
            permissions: perms.iter().map(|p| p.to_string()).collect(),
            groups: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_permissions_for_module_is_prefix_exact() {
        let auth = profile(&["inventory:read", "inventory:list", "inventory_admin:read", "hr:read"]);
        assert_eq!(
            auth.permissions_for_module("inventory"),
            vec!["inventory:list", "inventory:read"]
        );
    }

    #[test]
    fn test_ttl_remaining_never_negative() {
        let mut record = CacheRecord::new(profile(&[]), 10);
        record.expires_at = Utc::now() - chrono::Duration::seconds(5);
        assert_eq!(record.ttl_remaining(), chrono::Duration::zero());
        assert!(record.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_permissions_serialize_sorted() {
        let auth = profile(&["b:read", "a:read"]);
        let json = serde_json::to_value(&auth).unwrap();
        assert_eq!(json["permissions"], serde_json::json!(["a:read", "b:read"]));
    }

    #[test]
    fn test_source_label() {
        assert_eq!(CacheStatus::CacheHit.source_label(), "cache");
        assert_eq!(CacheStatus::CacheMiss.source_label(), "refreshed");
        assert_eq!(CacheStatus::CacheRefresh.to_string(), "cache_refresh");
    }
}
