//! OAuth login state and the Google OAuth/OIDC collaborator.

pub mod flow;
pub mod google;
pub mod jwks;
pub mod state;

pub use flow::AuthorizationCodeFlow;
pub use google::{CodeExchange, GoogleOAuthClient};
pub use state::{OAuthState, OAuthStateManager};
