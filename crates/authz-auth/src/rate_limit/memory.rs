//! In-memory trailing-window limiter.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use authz_core::result::AppResult;
use authz_core::traits::rate_limit::RateLimiter;

/// Single-node limiter keyed by an opaque string.
///
/// Uses tokio's monotonic clock, so wall-clock adjustments have no effect
/// and tests can drive the window with `tokio::time::advance`.
#[derive(Debug, Clone)]
pub struct MemoryRateLimiter {
    /// Maximum requests per window (at least 1).
    limit: usize,
    /// Window length (at least 1 second).
    window: Duration,
    /// Key → timestamps of accepted requests inside the window.
    windows: Arc<DashMap<String, VecDeque<Instant>>>,
}

impl MemoryRateLimiter {
    /// Creates a limiter; zero limits and windows are raised to 1.
    pub fn new(limit: u32, window_seconds: u64) -> Self {
        Self {
            limit: limit.max(1) as usize,
            window: Duration::from_secs(window_seconds.max(1)),
            windows: Arc::new(DashMap::new()),
        }
    }

    /// Effective request limit.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Effective window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Synchronous check used by the async trait method.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        // The entry guard holds the shard lock for the whole prune-check-push.
        let mut timestamps = self.windows.entry(key.to_string()).or_default();

        if let Some(cutoff) = now.checked_sub(self.window) {
            while timestamps.front().is_some_and(|&ts| ts <= cutoff) {
                timestamps.pop_front();
            }
        }

        if timestamps.len() >= self.limit {
            return false;
        }
        timestamps.push_back(now);
        true
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn allow(&self, key: &str) -> AppResult<bool> {
        Ok(self.check(key))
    }
}
