//! Signed, self-expiring internal session tokens.
//!
//! Tokens are compact HS256 JWTs whose claims are exactly the session
//! fields. Expiry is checked against `expires_at` after signature
//! verification, so a validly signed but lapsed token is still rejected.

use std::collections::HashSet;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;
use uuid::Uuid;

use authz_core::config::SessionConfig;
use authz_core::error::AppError;
use authz_core::models::InternalSession;
use authz_core::result::AppResult;

/// Issues and validates internal sessions.
#[derive(Clone)]
pub struct SessionManager {
    /// HMAC key for signing.
    encoding_key: EncodingKey,
    /// HMAC key for verification.
    decoding_key: DecodingKey,
    /// Signature-only validation; expiry is checked on the session fields.
    validation: Validation,
    /// Session lifetime in seconds.
    ttl_seconds: i64,
    /// Remaining lifetime at or below which a session should be re-issued.
    refresh_threshold_seconds: i64,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl_seconds", &self.ttl_seconds)
            .field("refresh_threshold_seconds", &self.refresh_threshold_seconds)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a manager from session configuration.
    pub fn new(config: &SessionConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding_key: EncodingKey::from_secret(config.signing_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.signing_secret.as_bytes()),
            validation,
            ttl_seconds: config.ttl_seconds as i64,
            refresh_threshold_seconds: config.refresh_threshold_seconds as i64,
        }
    }

    /// Session lifetime in seconds.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Stamp a new session with a fresh id and lifetime.
    pub fn create_session(&self, subject: &str, email: &str, cache_key: &str) -> InternalSession {
        let issued_at = Utc::now().timestamp();
        InternalSession {
            session_id: Uuid::new_v4().to_string(),
            subject: subject.to_string(),
            email: email.to_string(),
            cache_key: cache_key.to_string(),
            issued_at,
            expires_at: issued_at + self.ttl_seconds,
        }
    }

    /// A new session for the same identity, with a new id and expiry.
    pub fn reissue(&self, session: &InternalSession) -> InternalSession {
        self.create_session(&session.subject, &session.email, &session.cache_key)
    }

    /// Sign a session into a compact token.
    pub fn encode(&self, session: &InternalSession) -> AppResult<String> {
        encode(&Header::new(Algorithm::HS256), session, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode session token: {e}")))
    }

    /// Verify and decode a token at the current time.
    pub fn decode(&self, token: &str) -> AppResult<InternalSession> {
        self.decode_at(token, Utc::now().timestamp())
    }

    /// Verify and decode a token as of `now` (seconds since epoch).
    ///
    /// Every failure yields the same `invalid_session_token` error.
    pub fn decode_at(&self, token: &str, now: i64) -> AppResult<InternalSession> {
        let session = decode::<InternalSession>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "Session token rejected");
                AppError::invalid_session()
            })?
            .claims;

        if session.expires_at <= now {
            debug!(session_id = %session.session_id, "Session token expired");
            return Err(AppError::invalid_session());
        }
        Ok(session)
    }

    /// Whether the session is within the refresh threshold of expiring.
    pub fn requires_refresh(&self, session: &InternalSession) -> bool {
        self.requires_refresh_at(session, Utc::now().timestamp())
    }

    /// [`Self::requires_refresh`] as of `now`.
    pub fn requires_refresh_at(&self, session: &InternalSession, now: i64) -> bool {
        session.remaining_seconds(now) <= self.refresh_threshold_seconds
    }
}
