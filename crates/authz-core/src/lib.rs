//! # authz-core
//!
//! Core crate for the authorization gateway. Contains configuration schemas,
//! the normalized authorization models, collaborator traits, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other gateway crates.

pub mod config;
pub mod error;
pub mod models;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
