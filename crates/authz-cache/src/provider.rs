//! Cache manager that dispatches to the configured provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use authz_core::config::cache::CacheConfig;
use authz_core::error::AppError;
use authz_core::models::{CacheRecord, EffectiveAuth};
use authz_core::result::AppResult;
use authz_core::traits::cache::EffectiveAuthCache;

/// Cache manager that wraps the configured cache provider.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// The inner cache provider.
    inner: Arc<dyn EffectiveAuthCache>,
    /// Name of the selected provider, for health reporting.
    provider_name: &'static str,
}

impl CacheManager {
    /// Create a new cache manager from configuration.
    pub async fn new(config: &CacheConfig) -> AppResult<Self> {
        let (inner, provider_name): (Arc<dyn EffectiveAuthCache>, &'static str) =
            match config.provider.as_str() {
                #[cfg(feature = "redis-backend")]
                "redis" => {
                    info!("Initializing Redis EffectiveAuth cache");
                    let client = crate::redis::RedisClient::connect(&config.redis).await?;
                    (Arc::new(crate::redis::RedisAuthCache::new(client)), "redis")
                }
                #[cfg(feature = "memory")]
                "memory" => {
                    info!("Initializing in-memory EffectiveAuth cache");
                    (Arc::new(crate::memory::MemoryAuthCache::new()), "memory")
                }
                other => {
                    return Err(AppError::configuration(format!(
                        "Unknown cache provider: '{other}'. Supported: memory, redis"
                    )));
                }
            };

        Ok(Self {
            inner,
            provider_name,
        })
    }

    /// Create a cache manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn EffectiveAuthCache>) -> Self {
        Self {
            inner: provider,
            provider_name: "custom",
        }
    }

    /// Name of the active provider.
    pub fn provider_name(&self) -> &'static str {
        self.provider_name
    }
}

#[async_trait]
impl EffectiveAuthCache for CacheManager {
    async fn get(&self, key: &str) -> AppResult<Option<CacheRecord>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, auth: &EffectiveAuth, ttl_seconds: u64) -> AppResult<()> {
        self.inner.set(key, auth, ttl_seconds).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn close(&self) -> AppResult<()> {
        self.inner.close().await
    }
}
