//! Internal session tokens and cookie policy.

pub mod codec;
pub mod cookie;

pub use codec::SessionManager;
pub use cookie::{CookiePolicy, SameSitePolicy};
