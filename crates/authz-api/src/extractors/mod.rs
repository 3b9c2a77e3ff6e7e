//! Custom Axum extractors.

pub mod client;
pub mod json;
pub mod session;

pub use client::ClientAddr;
pub use json::ApiJson;
pub use session::SessionCookie;
