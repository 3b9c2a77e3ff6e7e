//! # authz-cache
//!
//! EffectiveAuth cache implementations. Supports two modes:
//!
//! - **memory**: In-process map using [dashmap](https://crates.io/crates/dashmap)
//! - **redis**: Shared store using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at startup based on configuration. Both honor
//! the same lazy-expiry contract so callers cannot tell them apart.

#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
