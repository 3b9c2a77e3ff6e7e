//! HTTP request handlers organized by domain.

pub mod auth;
pub mod authz;
pub mod health;
pub mod session;
