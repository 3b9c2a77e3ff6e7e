//! In-memory cache implementation backed by a sharded concurrent map.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use authz_core::models::{CacheRecord, EffectiveAuth};
use authz_core::result::AppResult;
use authz_core::traits::cache::EffectiveAuthCache;

/// In-process EffectiveAuth cache.
///
/// Each key lives in one dashmap shard, so a single-key read-modify-write
/// holds that shard's lock and cannot interleave with a writer to the same
/// key. Locks are never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuthCache {
    /// Cache key → record.
    entries: Arc<DashMap<String, CacheRecord>>,
}

impl MemoryAuthCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, including not-yet-evicted expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace a record verbatim (used to age entries in tests).
    pub fn insert_record(&self, key: &str, record: CacheRecord) {
        self.entries.insert(key.to_string(), record);
    }
}

#[async_trait]
impl EffectiveAuthCache for MemoryAuthCache {
    async fn get(&self, key: &str) -> AppResult<Option<CacheRecord>> {
        let now = Utc::now();
        {
            let Some(entry) = self.entries.get(key) else {
                return Ok(None);
            };
            if !entry.is_expired_at(now) {
                return Ok(Some(entry.clone()));
            }
        }

        // A concurrent `set` may have replaced the record since the read
        // guard dropped; only evict if it is still expired.
        let removed = self.entries.remove_if(key, |_, record| record.is_expired_at(now));
        if removed.is_some() {
            debug!(key, "Evicted expired EffectiveAuth record");
        }
        Ok(None)
    }

    async fn set(&self, key: &str, auth: &EffectiveAuth, ttl_seconds: u64) -> AppResult<()> {
        let record = CacheRecord::new(auth.clone(), ttl_seconds);
        self.entries.insert(key.to_string(), record);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn close(&self) -> AppResult<()> {
        self.entries.clear();
        Ok(())
    }
}
