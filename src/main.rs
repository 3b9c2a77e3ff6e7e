//! Workspace Authorization Gateway
//!
//! Main entry point that wires all crates together and starts the server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use authz_api::{AppState, build_app};
use authz_auth::{
    CookiePolicy, GoogleOAuthClient, IdentityResolver, NetworkAcl, OAuthStateManager,
    RateLimiterDispatch, SessionManager,
};
use authz_cache::CacheManager;
use authz_core::config::AppConfig;
use authz_core::error::AppError;
use authz_core::traits::cache::EffectiveAuthCache;
use authz_core::traits::token::TokenVerifier;
use authz_directory::{DirectoryAuthService, GoogleDirectoryClient};
use authz_service::{AuthorizationPipeline, EffectiveAuthResolver, RetryPolicy};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(code = e.code, "Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment, then check required secrets.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("AUTHZ_ENV").unwrap_or_else(|_| "local".to_string());
    let config = AppConfig::load(&env)?;
    config.validate()?;
    Ok(config)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        env = %config.app.env,
        "Starting {} v{}",
        config.app.name,
        config.app.version
    );

    // ── Step 1: Initialize cache ─────────────────────────────────
    tracing::info!(
        "Initializing cache (provider: {})...",
        config.cache.provider
    );
    let cache = Arc::new(CacheManager::new(&config.cache).await?);
    tracing::info!(provider = cache.provider_name(), "Cache initialized");

    // ── Step 2: Initialize directory client ──────────────────────
    tracing::info!("Initializing directory client...");
    let directory_client = GoogleDirectoryClient::from_config(&config.directory)?;
    let directory = DirectoryAuthService::new(
        Arc::new(directory_client),
        config.directory.auth_schema.clone(),
    );
    let profiles = EffectiveAuthResolver::new(
        Arc::clone(&cache) as Arc<dyn EffectiveAuthCache>,
        directory,
        &config.cache,
        RetryPolicy::from_config(&config.directory),
    );

    // ── Step 3: Initialize guards ────────────────────────────────
    let acl = Arc::new(NetworkAcl::new(&config.guard.allowed_networks));
    if acl.allows_all() {
        tracing::warn!("Network guard allows every address");
    }
    let limiter = Arc::new(RateLimiterDispatch::from_config(&config.guard, &config.cache.redis).await?);

    // ── Step 4: Initialize auth system ───────────────────────────
    tracing::info!("Initializing authentication system...");
    let sessions = SessionManager::new(&config.session);
    let oauth = Arc::new(GoogleOAuthClient::from_config(
        &config.oauth,
        config.directory.request_timeout_seconds,
    )?);
    let identity = IdentityResolver::new(
        sessions,
        Arc::clone(&oauth) as Arc<dyn TokenVerifier>,
        config.oauth.allowed_hosted_domain.clone(),
    );
    let oauth_state = Arc::new(OAuthStateManager::new(
        &config.session.signing_secret,
        config.oauth.state_ttl_seconds,
    ));
    let cookies = CookiePolicy::new(config.cookie_secure(), &config.session.cookie_samesite);

    // ── Step 5: Build pipeline and state ─────────────────────────
    let pipeline = Arc::new(AuthorizationPipeline::new(acl, limiter, identity, profiles));
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let app_state = AppState {
        config: Arc::new(config),
        pipeline,
        oauth,
        oauth_state,
        cookies,
    };
    let app = build_app(app_state);

    // ── Step 6: Start HTTP server ────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!("Authorization gateway listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 7: Release cache connections ────────────────────────
    match tokio::time::timeout(grace, cache.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "Cache close failed"),
        Err(_) => tracing::warn!("Cache close timed out"),
    }

    tracing::info!("Authorization gateway shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
