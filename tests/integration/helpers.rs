//! Shared test helpers for integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use authz_api::{AppState, build_app};
use authz_auth::oauth::CodeExchange;
use authz_auth::{
    AuthorizationCodeFlow, CookiePolicy, IdentityResolver, MemoryRateLimiter, NetworkAcl,
    OAuthState, OAuthStateManager, SessionManager,
};
use authz_cache::memory::MemoryAuthCache;
use authz_core::config::AppConfig;
use authz_core::error::{AppError, codes};
use authz_core::result::AppResult;
use authz_core::traits::directory::DirectoryClient;
use authz_core::traits::token::{IdTokenClaims, TokenInfo, TokenVerifier, UserInfo};
use authz_directory::DirectoryAuthService;
use authz_service::{AuthorizationPipeline, EffectiveAuthResolver, RetryPolicy};

/// Directory backed by a fixed email → functions table.
#[derive(Debug, Default)]
pub struct FakeDirectory {
    users: HashMap<String, Vec<String>>,
    /// Number of `get_user` calls.
    pub calls: AtomicUsize,
    /// When set, every call fails.
    pub down: AtomicBool,
}

impl FakeDirectory {
    fn with_user(mut self, email: &str, functions: &[&str]) -> Self {
        self.users.insert(
            email.to_string(),
            functions.iter().map(|f| f.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl DirectoryClient for FakeDirectory {
    async fn get_user(&self, email: &str) -> AppResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(AppError::workspace_unavailable());
        }
        let functions = self.users.get(email).cloned().unwrap_or_default();
        Ok(json!({
            "primaryEmail": email,
            "customSchemas": {"Authorization": {
                "HomeDepartment": "Warehouse",
                "UserFunctions": functions,
            }}
        }))
    }

    async fn list_groups(&self, _email: &str) -> AppResult<Value> {
        if self.down.load(Ordering::SeqCst) {
            return Err(AppError::workspace_unavailable());
        }
        Ok(json!({"groups": [{"email": "staff@example.com"}]}))
    }
}

/// Accepts `token:<email>` access tokens and `id:<email>:<nonce>` ID tokens.
#[derive(Debug, Default)]
pub struct FakeVerifier {
    /// Number of verification calls of either kind.
    pub calls: AtomicUsize,
}

#[async_trait]
impl TokenVerifier for FakeVerifier {
    async fn verify_id_token(&self, raw: &str) -> AppResult<IdTokenClaims> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut parts = raw.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("id"), Some(email), nonce) => Ok(IdTokenClaims {
                sub: format!("sub-{email}"),
                email: Some(email.to_string()),
                nonce: nonce.map(str::to_string),
                ..Default::default()
            }),
            _ => Err(AppError::authentication(codes::INVALID_ID_TOKEN, "Invalid ID token")),
        }
    }

    async fn introspect_access_token(&self, token: &str) -> AppResult<TokenInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match token.strip_prefix("token:") {
            Some(email) => Ok(TokenInfo {
                sub: Some(format!("sub-{email}")),
                email: Some(email.to_string()),
                ..Default::default()
            }),
            None => Err(AppError::authentication(
                codes::INVALID_ACCESS_TOKEN,
                "Invalid access token",
            )),
        }
    }

    async fn fetch_user_info(&self, _token: &str) -> AppResult<UserInfo> {
        Ok(UserInfo::default())
    }
}

/// Authorization URL echoes state and nonce; the code is returned as the ID token.
#[derive(Debug, Default)]
pub struct FakeCodeFlow;

#[async_trait]
impl AuthorizationCodeFlow for FakeCodeFlow {
    fn authorization_url(&self, state: &OAuthState) -> AppResult<String> {
        Ok(format!(
            "https://accounts.test/auth?state={}&nonce={}",
            state.state, state.nonce
        ))
    }

    async fn exchange_code(&self, code: &str) -> AppResult<CodeExchange> {
        Ok(CodeExchange {
            id_token: Some(code.to_string()),
            access_token: None,
        })
    }
}

/// Knobs for building a test application.
pub struct TestOptions {
    /// `guard.allowed_networks`.
    pub networks: Vec<String>,
    /// Requests per window.
    pub rate_limit: u32,
    /// `server.cors.allowed_origins`.
    pub origins: Vec<String>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            networks: vec!["*".to_string()],
            rate_limit: 100,
            origins: Vec::new(),
        }
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for minting sessions
    pub state: AppState,
    /// Directory fake
    pub directory: Arc<FakeDirectory>,
    /// Token verifier fake
    pub verifier: Arc<FakeVerifier>,
    /// Address requests appear to come from
    pub client_ip: SocketAddr,
}

/// Captured response
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// `name=value` pair of the `Set-Cookie` header issuing `name`.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let prefix = format!("{name}=");
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&prefix))
            .map(str::to_string)
    }

    /// Value of the cookie `name`, without attributes.
    pub fn cookie_value(&self, name: &str) -> Option<String> {
        self.cookie(name)
            .and_then(|c| c.split(';').next().map(str::to_string))
            .and_then(|pair| pair.split_once('=').map(|(_, v)| v.to_string()))
    }

    /// `Location` header.
    pub fn location(&self) -> Option<String> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

impl TestApp {
    /// Create a new test application with default options
    pub fn new() -> Self {
        Self::with_options(TestOptions::default())
    }

    /// Create a new test application
    pub fn with_options(options: TestOptions) -> Self {
        let mut config = AppConfig::default();
        config.session.signing_secret = "integration-secret".to_string();
        config.guard.allowed_networks = options.networks;
        config.guard.rate_limit_requests = options.rate_limit;
        config.server.cors.allowed_origins = options.origins;
        config.directory.sample_user_email = "sample@example.com".to_string();

        let directory = Arc::new(
            FakeDirectory::default()
                .with_user("jane@example.com", &["Inventory:Read", "Inventory:List"])
                .with_user("sample@example.com", &["Reports:Read"]),
        );
        let verifier = Arc::new(FakeVerifier::default());

        let profiles = EffectiveAuthResolver::new(
            Arc::new(MemoryAuthCache::new()),
            DirectoryAuthService::new(directory.clone(), "Authorization"),
            &config.cache,
            RetryPolicy::immediate(),
        );
        let identity = IdentityResolver::new(
            SessionManager::new(&config.session),
            verifier.clone(),
            None,
        );
        let pipeline = AuthorizationPipeline::new(
            Arc::new(NetworkAcl::new(&config.guard.allowed_networks)),
            Arc::new(MemoryRateLimiter::new(
                config.guard.rate_limit_requests,
                config.guard.rate_limit_window_seconds,
            )),
            identity,
            profiles,
        );

        let state = AppState {
            oauth_state: Arc::new(OAuthStateManager::new(
                &config.session.signing_secret,
                config.oauth.state_ttl_seconds,
            )),
            cookies: CookiePolicy::new(config.cookie_secure(), &config.session.cookie_samesite),
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            oauth: Arc::new(FakeCodeFlow),
        };

        Self {
            router: build_app(state.clone()),
            state,
            directory,
            verifier,
            client_ip: SocketAddr::from(([10, 0, 0, 7], 40000)),
        }
    }

    /// Same app, requests from another address
    pub fn from_ip(mut self, ip: [u8; 4]) -> Self {
        self.client_ip = SocketAddr::from((ip, 40000));
        self
    }

    /// A signed session cookie value for `email`
    pub fn session_token(&self, email: &str) -> String {
        let sessions = self.state.sessions();
        let session = sessions.create_session(
            &format!("sub-{email}"),
            email,
            &format!("auth:{email}"),
        );
        sessions.encode(&session).unwrap()
    }

    /// Directory `get_user` calls so far
    pub fn directory_calls(&self) -> usize {
        self.directory.calls.load(Ordering::SeqCst)
    }

    /// Make a JSON request to the app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).unwrap())
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let mut req = req.body(Body::from(body_str)).unwrap();
        req.extensions_mut().insert(ConnectInfo(self.client_ip));

        let response = self.router.clone().oneshot(req).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Request carrying the session cookie
    pub async fn with_session(&self, method: &str, path: &str, token: &str) -> TestResponse {
        let cookie = format!("ga_session={token}");
        self.request(method, path, None, &[("Cookie", cookie.as_str())])
            .await
    }
}
