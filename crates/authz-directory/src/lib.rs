//! # authz-directory
//!
//! The directory side of the gateway: fetching raw user records and group
//! memberships, and normalizing the custom-schema payload into an
//! [`EffectiveAuth`](authz_core::models::EffectiveAuth).
//!
//! ## Modules
//!
//! - `normalizer`: total, shape-tolerant custom-schema normalization
//! - `service_account`: service-account JWT bearer grant with token caching
//! - `client`: Directory API client implementing `DirectoryClient`
//! - `service`: `DirectoryAuthService`, which ties fetch and normalize together

pub mod client;
pub mod normalizer;
pub mod service;
pub mod service_account;

pub use client::GoogleDirectoryClient;
pub use normalizer::{PermissionNormalizer, slugify};
pub use service::DirectoryAuthService;
