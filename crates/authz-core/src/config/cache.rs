//! EffectiveAuth cache configuration.

use serde::{Deserialize, Serialize};

/// Top-level cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache provider type: `"memory"` or `"redis"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// TTL applied to every freshly fetched profile, in seconds.
    #[serde(default = "default_ttl")]
    pub effective_auth_ttl_seconds: u64,
    /// Remaining-TTL cutoff at or below which a hit is refreshed, in seconds.
    #[serde(default = "default_warm_threshold")]
    pub warm_threshold_seconds: u64,
    /// Redis-specific cache configuration.
    #[serde(default)]
    pub redis: RedisCacheConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            effective_auth_ttl_seconds: default_ttl(),
            warm_threshold_seconds: default_warm_threshold(),
            redis: RedisCacheConfig::default(),
        }
    }
}

/// Redis backend configuration, shared by the cache and the rate limiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisCacheConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Key prefix for all gateway keys.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_ttl() -> u64 {
    300
}

fn default_warm_threshold() -> u64 {
    60
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_key_prefix() -> String {
    "authz:".to_string()
}
