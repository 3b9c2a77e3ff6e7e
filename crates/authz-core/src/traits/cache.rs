//! EffectiveAuth cache contract.

use async_trait::async_trait;

use crate::models::{CacheRecord, EffectiveAuth};
use crate::result::AppResult;

/// Cache-aside store mapping a cache key to a normalized profile.
///
/// Implementations must:
/// - treat a record whose `expires_at` has passed as absent and remove it,
/// - overwrite on `set` and restart the TTL,
/// - keep single-key mutations atomic with respect to concurrent callers.
#[async_trait]
pub trait EffectiveAuthCache: Send + Sync + std::fmt::Debug + 'static {
    /// Return the live record for `key`, lazily evicting an expired one.
    async fn get(&self, key: &str) -> AppResult<Option<CacheRecord>>;

    /// Store `auth` under `key` for `ttl_seconds`.
    async fn set(&self, key: &str, auth: &EffectiveAuth, ttl_seconds: u64) -> AppResult<()>;

    /// Remove `key` if present.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Release backend resources.
    async fn close(&self) -> AppResult<()>;
}
