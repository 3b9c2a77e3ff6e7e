//! Per-key trailing-window rate limiting.
//!
//! Provides the limiter using either:
//! - An in-process sharded map (single node)
//! - Redis Lua scripts (shared across nodes)

pub mod dispatch;
pub mod memory;
#[cfg(feature = "redis-limiter")]
pub mod redis;

pub use dispatch::RateLimiterDispatch;
pub use memory::MemoryRateLimiter;
#[cfg(feature = "redis-limiter")]
pub use self::redis::RedisRateLimiter;
