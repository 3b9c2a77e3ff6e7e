//! Single retry with jittered backoff for directory fetches.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{error, warn};

use authz_core::config::DirectoryConfig;
use authz_core::error::AppError;
use authz_core::result::AppResult;

/// Backoff bounds for the one retry a directory fetch gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Lower bound of the delay.
    pub min_delay: Duration,
    /// Upper bound of the delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(400),
        }
    }
}

impl RetryPolicy {
    /// Bounds from directory configuration; swapped if given in reverse.
    pub fn from_config(config: &DirectoryConfig) -> Self {
        let a = config.retry_backoff_min_ms;
        let b = config.retry_backoff_max_ms;
        Self {
            min_delay: Duration::from_millis(a.min(b)),
            max_delay: Duration::from_millis(a.max(b)),
        }
    }

    /// No delay between attempts.
    pub fn immediate() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// A random delay within the bounds.
    pub fn jittered_delay(&self) -> Duration {
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        if max <= min {
            return self.min_delay;
        }
        Duration::from_millis(rand::rng().random_range(min..=max))
    }

    /// Run `operation`, retrying once after a jittered delay.
    ///
    /// A second failure is logged with its cause and surfaced as the generic
    /// `workspace_unavailable` error.
    pub async fn run_once<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        match operation().await {
            Ok(value) => Ok(value),
            Err(first) => {
                let delay = self.jittered_delay();
                warn!(
                    operation = %operation_name,
                    error = %first,
                    delay_ms = delay.as_millis() as u64,
                    "Operation failed, retrying once"
                );
                tokio::time::sleep(delay).await;

                operation().await.map_err(|second| {
                    error!(
                        operation = %operation_name,
                        error = %second,
                        "Operation failed after retry"
                    );
                    AppError::workspace_unavailable()
                })
            }
        }
    }
}
