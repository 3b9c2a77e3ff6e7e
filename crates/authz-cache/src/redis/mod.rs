//! Redis-backed EffectiveAuth cache.

pub mod client;
pub mod operations;

pub use client::RedisClient;
pub use operations::RedisAuthCache;
