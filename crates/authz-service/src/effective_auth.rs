//! Cache-aside EffectiveAuth resolution with warm refresh.
//!
//! A hit with more than `warm_threshold` seconds left is served directly.
//! Anything at or below the threshold, or absent, is re-fetched from the
//! directory and written back with a fresh TTL. Concurrent stale callers are
//! not de-duplicated: each fetches and writes, and the last write wins.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use authz_core::config::CacheConfig;
use authz_core::models::{CacheStatus, DirectoryProfile, EffectiveAuth, ResolvedIdentity};
use authz_core::result::AppResult;
use authz_core::traits::cache::EffectiveAuthCache;
use authz_directory::DirectoryAuthService;

use crate::retry::RetryPolicy;

/// A profile together with how it was obtained.
#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    /// The profile.
    pub effective_auth: EffectiveAuth,
    /// Hit, refresh, or miss.
    pub cache_status: CacheStatus,
}

/// Resolves profiles through the cache, falling back to the directory.
#[derive(Debug, Clone)]
pub struct EffectiveAuthResolver {
    cache: Arc<dyn EffectiveAuthCache>,
    directory: DirectoryAuthService,
    ttl_seconds: u64,
    warm_threshold: Duration,
    retry: RetryPolicy,
}

impl EffectiveAuthResolver {
    /// Creates a resolver.
    pub fn new(
        cache: Arc<dyn EffectiveAuthCache>,
        directory: DirectoryAuthService,
        config: &CacheConfig,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            cache,
            directory,
            ttl_seconds: config.effective_auth_ttl_seconds,
            warm_threshold: Duration::seconds(config.warm_threshold_seconds as i64),
            retry,
        }
    }

    /// Serve from cache when warm, otherwise fetch and store.
    ///
    /// Cache read failures degrade to a miss; the directory stays the source of truth.
    pub async fn resolve(&self, identity: &ResolvedIdentity) -> AppResult<ResolvedProfile> {
        let cached = match self.cache.get(&identity.cache_key).await {
            Ok(record) => record,
            Err(e) => {
                warn!(key = %identity.cache_key, error = %e, "Cache read failed; treating as miss");
                None
            }
        };

        let status = match cached {
            Some(record) if record.ttl_remaining() > self.warm_threshold => {
                debug!(key = %identity.cache_key, "EffectiveAuth cache hit");
                return Ok(ResolvedProfile {
                    effective_auth: record.effective_auth,
                    cache_status: CacheStatus::CacheHit,
                });
            }
            Some(_) => CacheStatus::CacheRefresh,
            None => CacheStatus::CacheMiss,
        };

        let effective_auth = self.fetch_and_store(identity).await?;
        Ok(ResolvedProfile {
            effective_auth,
            cache_status: status,
        })
    }

    /// Re-fetch regardless of cache state.
    pub async fn force_refresh(&self, identity: &ResolvedIdentity) -> AppResult<ResolvedProfile> {
        let effective_auth = self.fetch_and_store(identity).await?;
        Ok(ResolvedProfile {
            effective_auth,
            cache_status: CacheStatus::CacheRefresh,
        })
    }

    /// Fetch straight from the directory, bypassing the cache, with raw payloads.
    pub async fn fetch_direct(&self, email: &str) -> AppResult<DirectoryProfile> {
        self.retry
            .run_once("directory_fetch", || self.directory.fetch_effective_auth(email))
            .await
    }

    /// Best-effort removal of a cached profile.
    pub async fn invalidate(&self, cache_key: &str) {
        if let Err(e) = self.cache.delete(cache_key).await {
            warn!(key = %cache_key, error = %e, "Cache invalidation failed");
        }
    }

    async fn fetch_and_store(&self, identity: &ResolvedIdentity) -> AppResult<EffectiveAuth> {
        // No lock is held here; the write happens only after a successful fetch.
        let profile = self.fetch_direct(&identity.email).await?;
        let effective_auth = profile.effective_auth;

        if let Err(e) = self
            .cache
            .set(&identity.cache_key, &effective_auth, self.ttl_seconds)
            .await
        {
            warn!(key = %identity.cache_key, error = %e, "Cache write failed");
        } else {
            info!(
                key = %identity.cache_key,
                ttl_seconds = self.ttl_seconds,
                "EffectiveAuth cached"
            );
        }
        Ok(effective_auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::{Value, json};

    use authz_cache::memory::MemoryAuthCache;
    use authz_core::error::{AppError, codes};
    use authz_core::models::{CacheRecord, CredentialSource};
    use authz_core::traits::directory::DirectoryClient;

    #[derive(Default)]
    struct CountingDirectory {
        calls: AtomicUsize,
        fail_first: usize,
    }

    #[async_trait]
    impl DirectoryClient for CountingDirectory {
        async fn get_user(&self, email: &str) -> AppResult<Value> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                return Err(AppError::upstream(codes::WORKSPACE_UNAVAILABLE, "boom"));
            }
            Ok(json!({
                "primaryEmail": email,
                "customSchemas": {"Authorization": {"UserFunctions": ["Inventory:Read"]}}
            }))
        }

        async fn list_groups(&self, _email: &str) -> AppResult<Value> {
            Ok(json!({"groups": []}))
        }
    }

    fn setup(directory: Arc<CountingDirectory>) -> (EffectiveAuthResolver, MemoryAuthCache) {
        let cache = MemoryAuthCache::new();
        let resolver = EffectiveAuthResolver::new(
            Arc::new(cache.clone()),
            DirectoryAuthService::new(directory, "Authorization"),
            &CacheConfig::default(),
            RetryPolicy::immediate(),
        );
        (resolver, cache)
    }

    fn identity() -> ResolvedIdentity {
        ResolvedIdentity::from_email("a@example.com", CredentialSource::AccessToken, None)
    }

    fn aged_record(seconds_left: i64) -> CacheRecord {
        CacheRecord {
            effective_auth: EffectiveAuth {
                email: "a@example.com".into(),
                home_department: None,
                is_department_manager: false,
                functions: Vec::new(),
                permissions: Default::default(),
                groups: Vec::new(),
                fetched_at: Utc::now(),
            },
            expires_at: Utc::now() + Duration::seconds(seconds_left),
        }
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let directory = Arc::new(CountingDirectory::default());
        let (resolver, _cache) = setup(directory.clone());

        let first = resolver.resolve(&identity()).await.unwrap();
        assert_eq!(first.cache_status, CacheStatus::CacheMiss);
        assert!(first.effective_auth.has_permission("inventory:read"));

        let second = resolver.resolve(&identity()).await.unwrap();
        assert_eq!(second.cache_status, CacheStatus::CacheHit);
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_hit_refreshes_and_extends_expiry() {
        let directory = Arc::new(CountingDirectory::default());
        let (resolver, cache) = setup(directory.clone());
        let stale = aged_record(30);
        let old_expiry = stale.expires_at;
        cache.insert_record("auth:a@example.com", stale);

        let resolved = resolver.resolve(&identity()).await.unwrap();
        assert_eq!(resolved.cache_status, CacheStatus::CacheRefresh);
        assert!(resolved.effective_auth.has_permission("inventory:read"));

        let record = cache.get("auth:a@example.com").await.unwrap().unwrap();
        assert!(record.expires_at > old_expiry);
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exactly_at_threshold_is_stale() {
        let directory = Arc::new(CountingDirectory::default());
        let (resolver, cache) = setup(directory);
        cache.insert_record("auth:a@example.com", aged_record(60));
        let resolved = resolver.resolve(&identity()).await.unwrap();
        assert_eq!(resolved.cache_status, CacheStatus::CacheRefresh);
    }

    #[tokio::test]
    async fn test_warm_hit_served_without_directory() {
        let directory = Arc::new(CountingDirectory::default());
        let (resolver, cache) = setup(directory.clone());
        cache.insert_record("auth:a@example.com", aged_record(200));

        let resolved = resolver.resolve(&identity()).await.unwrap();
        assert_eq!(resolved.cache_status, CacheStatus::CacheHit);
        assert_eq!(directory.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_single_retry_then_success() {
        let directory = Arc::new(CountingDirectory {
            fail_first: 1,
            ..Default::default()
        });
        let (resolver, _cache) = setup(directory.clone());
        let resolved = resolver.resolve(&identity()).await.unwrap();
        assert_eq!(resolved.cache_status, CacheStatus::CacheMiss);
        assert_eq!(directory.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_two_failures_surface_upstream_error_without_caching() {
        let directory = Arc::new(CountingDirectory {
            fail_first: 5,
            ..Default::default()
        });
        let (resolver, cache) = setup(directory.clone());
        let err = resolver.resolve(&identity()).await.unwrap_err();
        assert_eq!(err.code, codes::WORKSPACE_UNAVAILABLE);
        assert_eq!(directory.calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_force_refresh_and_invalidate() {
        let directory = Arc::new(CountingDirectory::default());
        let (resolver, cache) = setup(directory.clone());
        resolver.resolve(&identity()).await.unwrap();

        let refreshed = resolver.force_refresh(&identity()).await.unwrap();
        assert_eq!(refreshed.cache_status, CacheStatus::CacheRefresh);
        assert_eq!(directory.calls.load(Ordering::SeqCst), 2);

        resolver.invalidate("auth:a@example.com").await;
        assert!(cache.is_empty());
    }
}
