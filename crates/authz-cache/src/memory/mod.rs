//! In-process EffectiveAuth cache.

pub mod store;

pub use store::MemoryAuthCache;
