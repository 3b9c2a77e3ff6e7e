//! Authorization-code flow contract used by the login endpoints.

use async_trait::async_trait;

use authz_core::result::AppResult;

use super::google::CodeExchange;
use super::state::OAuthState;

/// The two provider interactions of a browser login.
#[async_trait]
pub trait AuthorizationCodeFlow: Send + Sync + std::fmt::Debug + 'static {
    /// Provider URL the browser is redirected to.
    fn authorization_url(&self, state: &OAuthState) -> AppResult<String>;

    /// Exchange the code returned to the callback.
    async fn exchange_code(&self, code: &str) -> AppResult<CodeExchange>;
}
