//! Collaborator traits defined in `authz-core` and implemented by other crates.
//!
//! Each trait is a narrow seam selected at composition time; callers never
//! see which backend sits behind it.

pub mod cache;
pub mod directory;
pub mod rate_limit;
pub mod token;

pub use cache::EffectiveAuthCache;
pub use directory::DirectoryClient;
pub use rate_limit::RateLimiter;
pub use token::{IdTokenClaims, TokenInfo, TokenVerifier, UserInfo};
