//! Rate limiter contract.

use async_trait::async_trait;

use crate::result::AppResult;

/// Bounds request volume per opaque key within a trailing window.
#[async_trait]
pub trait RateLimiter: Send + Sync + std::fmt::Debug + 'static {
    /// Record one request for `key`; `false` when the window is already full.
    async fn allow(&self, key: &str) -> AppResult<bool>;
}
