//! Redis-backed trailing-window limiter using a Lua script for atomicity.
//!
//! Suitable for multi-node deployments. Timestamps are wall-clock
//! milliseconds because a monotonic clock cannot be shared across processes.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info};

use authz_core::error::AppError;
use authz_core::result::AppResult;
use authz_core::traits::rate_limit::RateLimiter;

/// Lua script for an atomic prune-check-record.
///
/// KEYS[1] = per-key sorted set
/// ARGV[1] = now (ms)
/// ARGV[2] = window (ms)
/// ARGV[3] = limit
/// ARGV[4] = unique member for this request
///
/// Returns:
///   1 = accepted
///   0 = rejected (window full)
const ALLOW_SCRIPT: &str = r#"
    local key = KEYS[1]
    local now = tonumber(ARGV[1])
    local window = tonumber(ARGV[2])
    local limit = tonumber(ARGV[3])

    redis.call('ZREMRANGEBYSCORE', key, '-inf', now - window)

    if redis.call('ZCARD', key) >= limit then
        return 0
    end

    redis.call('ZADD', key, now, ARGV[4])
    redis.call('PEXPIRE', key, window)
    return 1
"#;

/// Limiter shared by every gateway instance pointing at the same Redis.
#[derive(Clone)]
pub struct RedisRateLimiter {
    /// Redis connection manager.
    conn: redis::aio::ConnectionManager,
    /// Prepended to every limiter key.
    key_prefix: String,
    /// Maximum requests per window (at least 1).
    limit: u32,
    /// Window in milliseconds (at least 1 second).
    window_ms: i64,
    script: redis::Script,
}

impl std::fmt::Debug for RedisRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRateLimiter")
            .field("key_prefix", &self.key_prefix)
            .field("limit", &self.limit)
            .field("window_ms", &self.window_ms)
            .finish_non_exhaustive()
    }
}

impl RedisRateLimiter {
    /// Connects to Redis and prepares the script.
    pub async fn connect(
        redis_url: &str,
        key_prefix: &str,
        limit: u32,
        window_seconds: u64,
    ) -> AppResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| AppError::configuration(format!("Invalid Redis URL: {e}")))?;

        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| AppError::cache(format!("Redis connection manager failed: {e}")))?;

        let limit = limit.max(1);
        let window_ms = (window_seconds.max(1) as i64).saturating_mul(1000);

        info!(limit, window_ms, "Redis rate limiter initialized");

        Ok(Self {
            conn,
            key_prefix: format!("{key_prefix}ratelimit:"),
            limit,
            window_ms,
            script: redis::Script::new(ALLOW_SCRIPT),
        })
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn allow(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.conn.clone();
        let now_ms = Utc::now().timestamp_millis();
        let member = format!("{now_ms}-{}", uuid::Uuid::new_v4().simple());

        let accepted: i32 = self
            .script
            .key(format!("{}{key}", self.key_prefix))
            .arg(now_ms)
            .arg(self.window_ms)
            .arg(self.limit)
            .arg(member)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                error!(error = %e, "Rate limit script failed");
                AppError::cache(format!("Rate limit script failed: {e}"))
            })?;

        Ok(accepted == 1)
    }
}
