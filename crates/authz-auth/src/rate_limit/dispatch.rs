//! Rate limiter selection by configuration.

use async_trait::async_trait;
use tracing::info;

use authz_core::config::{GuardConfig, RedisCacheConfig};
use authz_core::error::AppError;
use authz_core::result::AppResult;
use authz_core::traits::rate_limit::RateLimiter;

use super::memory::MemoryRateLimiter;
#[cfg(feature = "redis-limiter")]
use super::redis::RedisRateLimiter;

/// Dispatcher for rate limiting strategies.
///
/// Switches between in-memory and Redis-based limiting based on configuration.
#[derive(Debug, Clone)]
pub enum RateLimiterDispatch {
    /// In-memory limiter (single node).
    Memory(MemoryRateLimiter),
    /// Redis-based limiter (multi-node).
    #[cfg(feature = "redis-limiter")]
    Redis(RedisRateLimiter),
}

impl RateLimiterDispatch {
    /// Creates the limiter named by `guard.rate_limit_backend`.
    ///
    /// The Redis backend shares the cache's Redis URL and key prefix.
    pub async fn from_config(guard: &GuardConfig, redis: &RedisCacheConfig) -> AppResult<Self> {
        match guard.rate_limit_backend.as_str() {
            "memory" => {
                info!(
                    limit = guard.rate_limit_requests,
                    window_seconds = guard.rate_limit_window_seconds,
                    "Initializing in-memory rate limiter"
                );
                Ok(Self::Memory(MemoryRateLimiter::new(
                    guard.rate_limit_requests,
                    guard.rate_limit_window_seconds,
                )))
            }
            #[cfg(feature = "redis-limiter")]
            "redis" => {
                let limiter = RedisRateLimiter::connect(
                    &redis.url,
                    &redis.key_prefix,
                    guard.rate_limit_requests,
                    guard.rate_limit_window_seconds,
                )
                .await?;
                Ok(Self::Redis(limiter))
            }
            other => {
                let _ = redis;
                Err(AppError::configuration(format!(
                    "Unknown rate limit backend: '{other}'. Supported: memory, redis"
                )))
            }
        }
    }
}

#[async_trait]
impl RateLimiter for RateLimiterDispatch {
    async fn allow(&self, key: &str) -> AppResult<bool> {
        match self {
            Self::Memory(inner) => inner.allow(key).await,
            #[cfg(feature = "redis-limiter")]
            Self::Redis(inner) => inner.allow(key).await,
        }
    }
}
