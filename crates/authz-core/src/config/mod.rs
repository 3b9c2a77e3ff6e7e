//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! optional TOML files plus `AUTHZ__`-prefixed environment variables. The
//! resulting [`AppConfig`] is built once at startup and handed to every
//! component constructor.

pub mod app;
pub mod cache;
pub mod directory;
pub mod guard;
pub mod logging;
pub mod oauth;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::app::{AppInfo, CorsConfig, ServerConfig};
pub use self::cache::{CacheConfig, RedisCacheConfig};
pub use self::directory::DirectoryConfig;
pub use self::guard::GuardConfig;
pub use self::logging::LoggingConfig;
pub use self::oauth::OAuthConfig;
pub use self::session::SessionConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment identity (environment, name, version).
    #[serde(default)]
    pub app: AppInfo,
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Directory collaborator settings.
    #[serde(default)]
    pub directory: DirectoryConfig,
    /// OAuth client and token verification settings.
    #[serde(default)]
    pub oauth: OAuthConfig,
    /// EffectiveAuth cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Internal session settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Network admission and rate limiting settings.
    #[serde(default)]
    pub guard: GuardConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment.
    ///
    /// Merges `config/default.toml`, `config/{env}.toml`, and environment
    /// variables prefixed with `AUTHZ` (sections separated by `__`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .set_default("app.env", env)?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("AUTHZ")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("guard.allowed_networks")
                    .with_list_parse_key("server.cors.allowed_origins")
                    .with_list_parse_key("oauth.additional_audiences")
                    .with_list_parse_key("directory.additional_scopes")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Report every missing required secret at once.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut missing = Vec::new();
        if self.directory.delegated_user.as_deref().unwrap_or("").is_empty() {
            missing.push("AUTHZ__DIRECTORY__DELEGATED_USER");
        }
        if self.oauth.client_id.is_empty() {
            missing.push("AUTHZ__OAUTH__CLIENT_ID");
        }
        if self.oauth.client_secret.is_empty() {
            missing.push("AUTHZ__OAUTH__CLIENT_SECRET");
        }
        if self.oauth.redirect_uri.is_empty() {
            missing.push("AUTHZ__OAUTH__REDIRECT_URI");
        }
        if self.session.signing_secret.is_empty() {
            missing.push("AUTHZ__SESSION__SIGNING_SECRET");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::configuration(format!(
                "Missing required settings: {}",
                missing.join(", ")
            )))
        }
    }

    /// Whether the deployment is a local/development one.
    pub fn is_local(&self) -> bool {
        self.app.is_local()
    }

    /// Whether session and state cookies carry the `Secure` attribute.
    pub fn cookie_secure(&self) -> bool {
        self.session.cookie_secure.unwrap_or_else(|| !self.is_local())
    }
}
