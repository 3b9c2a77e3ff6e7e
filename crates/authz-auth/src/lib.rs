//! # authz-auth
//!
//! The security gates that run before any profile is served.
//!
//! ## Modules
//!
//! - `network`: IPv4 admission control list
//! - `rate_limit`: trailing-window limiters (in-memory and Redis) and their dispatcher
//! - `session`: signed internal session tokens and cookie attribute policy
//! - `oauth`: OAuth state/nonce cookie and the Google OAuth/OIDC collaborator
//! - `identity`: the credential union and three-way identity resolution

pub mod identity;
pub mod network;
pub mod oauth;
pub mod rate_limit;
pub mod session;

pub use identity::{Credential, IdentityResolver};
pub use network::NetworkAcl;
pub use oauth::{AuthorizationCodeFlow, GoogleOAuthClient, OAuthState, OAuthStateManager};
pub use rate_limit::{MemoryRateLimiter, RateLimiterDispatch};
pub use session::{CookiePolicy, SessionManager};
