//! Shared application state passed to all handlers via Axum's `State` extractor.

use std::sync::Arc;

use authz_auth::{AuthorizationCodeFlow, CookiePolicy, OAuthStateManager, SessionManager};
use authz_core::config::AppConfig;
use authz_service::AuthorizationPipeline;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Guard → resolve → cache → evaluate pipeline.
    pub pipeline: Arc<AuthorizationPipeline>,
    /// Provider side of the browser login.
    pub oauth: Arc<dyn AuthorizationCodeFlow>,
    /// Signs and verifies the login state cookie.
    pub oauth_state: Arc<OAuthStateManager>,
    /// Resolved cookie attributes.
    pub cookies: CookiePolicy,
}

impl AppState {
    /// Session codec.
    pub fn sessions(&self) -> &SessionManager {
        self.pipeline.identity().sessions()
    }

    /// Name of the session cookie.
    pub fn session_cookie_name(&self) -> &str {
        &self.config.session.cookie_name
    }
}
