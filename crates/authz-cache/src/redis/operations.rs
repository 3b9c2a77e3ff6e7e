//! Redis EffectiveAuth cache implementation.

use async_trait::async_trait;
use chrono::Utc;
use redis::AsyncCommands;
use tracing::{debug, warn};

use authz_core::error::{AppError, ErrorKind, codes};
use authz_core::models::{CacheRecord, EffectiveAuth};
use authz_core::result::AppResult;
use authz_core::traits::cache::EffectiveAuthCache;

use super::client::RedisClient;

/// Redis-backed EffectiveAuth cache.
///
/// Records are stored as JSON `{effective_auth, expires_at}` with a matching
/// `EX`. The embedded expiry is checked on read as well, so a record served
/// by a lagging replica is still treated as absent once lapsed.
#[derive(Debug, Clone)]
pub struct RedisAuthCache {
    /// Redis client.
    client: RedisClient,
}

impl RedisAuthCache {
    /// Create a new Redis cache.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Cache, codes::CACHE_ERROR, "Redis cache error", e)
    }
}

#[async_trait]
impl EffectiveAuthCache for RedisAuthCache {
    async fn get(&self, key: &str) -> AppResult<Option<CacheRecord>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let payload: Option<String> = conn.get(&full_key).await.map_err(Self::map_err)?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        let record: CacheRecord = match serde_json::from_str(&payload) {
            Ok(record) => record,
            Err(e) => {
                warn!(key, error = %e, "Dropping unreadable cache record");
                let _: () = conn.del(&full_key).await.map_err(Self::map_err)?;
                return Ok(None);
            }
        };

        if record.is_expired_at(Utc::now()) {
            debug!(key, "Evicted expired EffectiveAuth record");
            let _: () = conn.del(&full_key).await.map_err(Self::map_err)?;
            return Ok(None);
        }

        Ok(Some(record))
    }

    async fn set(&self, key: &str, auth: &EffectiveAuth, ttl_seconds: u64) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let record = CacheRecord::new(auth.clone(), ttl_seconds);
        let payload = serde_json::to_string(&record)?;
        let mut conn = self.client.conn_mut();
        // EX 0 is rejected by Redis; the embedded expiry still applies.
        let _: () = conn
            .set_ex(&full_key, payload, ttl_seconds.max(1))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let _: () = conn.del(&full_key).await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn close(&self) -> AppResult<()> {
        // The connection manager closes when its last clone drops.
        debug!("Redis EffectiveAuth cache closed");
        Ok(())
    }
}
