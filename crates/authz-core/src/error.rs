//! Unified application error types for the authorization gateway.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Every error carries a stable
//! machine-readable code next to the human message so the HTTP layer can
//! render `{error, error_code}` without inspecting message text.

use std::fmt;
use thiserror::Error;

/// Stable machine tokens rendered as `error_code`.
pub mod codes {
    /// The caller's network address is outside the admission ruleset.
    pub const NETWORK_NOT_ALLOWED: &str = "network_not_allowed";
    /// The caller exceeded the request window.
    pub const RATE_LIMITED: &str = "rate_limited";
    /// Session token is missing, malformed, tampered with, or expired.
    pub const INVALID_SESSION_TOKEN: &str = "invalid_session_token";
    /// No session cookie was presented.
    pub const MISSING_SESSION: &str = "missing_session";
    /// The OAuth identity token failed verification.
    pub const INVALID_ID_TOKEN: &str = "invalid_id_token";
    /// The OAuth access token could not be introspected.
    pub const INVALID_ACCESS_TOKEN: &str = "invalid_access_token";
    /// The identity belongs to a hosted domain that is not allowed.
    pub const DOMAIN_NOT_ALLOWED: &str = "domain_not_allowed";
    /// The directory service could not be reached after retrying.
    pub const WORKSPACE_UNAVAILABLE: &str = "workspace_unavailable";
    /// The cached profile lacks the evaluated permission.
    pub const PERMISSION_MISSING: &str = "permission_missing";
    /// Zero or several credentials were supplied.
    pub const INVALID_CREDENTIALS: &str = "invalid_credentials";
    /// The requested RBAC verb is not in the allow-list.
    pub const INVALID_ACTION: &str = "invalid_action";
    /// The requested module slugifies to nothing.
    pub const INVALID_MODULE: &str = "invalid_module";
    /// Request body could not be parsed.
    pub const INVALID_REQUEST: &str = "invalid_request";
    /// OAuth state cookie missing, expired, or not matching the callback.
    pub const OAUTH_STATE_MISMATCH: &str = "oauth_state_mismatch";
    /// The OAuth response lacks a required claim.
    pub const MISSING_CLAIMS: &str = "missing_claims";
    /// The request `Origin` is not trusted for a state-changing call.
    pub const ORIGIN_NOT_ALLOWED: &str = "origin_not_allowed";
    /// Catch-all for unexpected failures.
    pub const INTERNAL_ERROR: &str = "internal_error";
    /// Configuration is missing or invalid.
    pub const CONFIGURATION_ERROR: &str = "configuration_error";
    /// Cache backend failure.
    pub const CACHE_ERROR: &str = "cache_error";
}

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Malformed or ambiguous input.
    Validation,
    /// Caller identity could not be established.
    Authentication,
    /// Caller is known but not allowed (network, domain, permission).
    Authorization,
    /// A rate limit was exceeded.
    RateLimit,
    /// An upstream dependency (directory, token endpoints) failed.
    Upstream,
    /// The requested resource was not found.
    NotFound,
    /// A configuration error occurred.
    Configuration,
    /// A cache backend error occurred.
    Cache,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal server error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Upstream => write!(f, "UPSTREAM"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Cache => write!(f, "CACHE"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        code: &'static str,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error.
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, code, message)
    }

    /// Create an authentication error.
    pub fn authentication(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, code, message)
    }

    /// Create an authorization error.
    pub fn authorization(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, code, message)
    }

    /// Create a rate-limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimit, codes::RATE_LIMITED, message)
    }

    /// Create an upstream error.
    pub fn upstream(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Upstream, code, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, "not_found", message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, codes::CONFIGURATION_ERROR, message)
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, codes::CACHE_ERROR, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, codes::INTERNAL_ERROR, message)
    }

    /// The single error surfaced for every session decode failure.
    ///
    /// Signature, expiry, and structural failures are deliberately
    /// indistinguishable to the caller.
    pub fn invalid_session() -> Self {
        Self::authentication(codes::INVALID_SESSION_TOKEN, "Invalid or expired session token")
    }

    /// The single error surfaced when the directory cannot be reached.
    pub fn workspace_unavailable() -> Self {
        Self::upstream(
            codes::WORKSPACE_UNAVAILABLE,
            "Workspace directory is temporarily unavailable",
        )
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            code: self.code,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            codes::INTERNAL_ERROR,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            codes::CONFIGURATION_ERROR,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_errors_share_one_shape() {
        let err = AppError::invalid_session();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(err.code, codes::INVALID_SESSION_TOKEN);
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::other("boom");
        let err = AppError::with_source(ErrorKind::Upstream, codes::WORKSPACE_UNAVAILABLE, "x", io);
        assert!(err.source.is_some());
        let cloned = err.clone();
        assert!(cloned.source.is_none());
        assert_eq!(cloned.code, codes::WORKSPACE_UNAVAILABLE);
    }

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::rate_limited("slow down");
        assert_eq!(err.to_string(), "RATE_LIMIT: slow down");
    }
}
