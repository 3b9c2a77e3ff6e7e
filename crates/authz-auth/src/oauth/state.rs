//! Signed, short-lived state/nonce cookie for one login attempt.

use std::collections::HashSet;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use authz_core::error::{AppError, codes};
use authz_core::result::AppResult;

/// Audience binding state tokens to this purpose so they never decode as sessions.
const STATE_AUDIENCE: &str = "google-authz-oauth";

/// Random bytes per state or nonce value.
const TOKEN_BYTES: usize = 32;

/// One login attempt's anti-forgery values. Never persisted server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthState {
    /// Echoed back by the provider on the callback query string.
    pub state: String,
    /// Bound into the ID token by the provider.
    pub nonce: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateClaims {
    state: String,
    nonce: String,
    aud: String,
    exp: i64,
}

/// Generates, signs, and verifies [`OAuthState`] cookies.
#[derive(Clone)]
pub struct OAuthStateManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl std::fmt::Debug for OAuthStateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthStateManager")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl OAuthStateManager {
    /// Creates a manager signing with the session secret.
    pub fn new(signing_secret: &str, ttl_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(&[STATE_AUDIENCE]);
        validation.required_spec_claims = HashSet::from(["exp".to_string(), "aud".to_string()]);

        Self {
            encoding_key: EncodingKey::from_secret(signing_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(signing_secret.as_bytes()),
            validation,
            ttl_seconds,
        }
    }

    /// Cookie lifetime in seconds.
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Fresh random state and nonce.
    pub fn generate(&self) -> OAuthState {
        OAuthState {
            state: random_token(),
            nonce: random_token(),
        }
    }

    /// Sign a state for the cookie.
    pub fn encode(&self, state: &OAuthState) -> AppResult<String> {
        let claims = StateClaims {
            state: state.state.clone(),
            nonce: state.nonce.clone(),
            aud: STATE_AUDIENCE.to_string(),
            exp: Utc::now().timestamp() + self.ttl_seconds as i64,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode OAuth state: {e}")))
    }

    /// Verify a cookie value; a bad signature or expiry is a state mismatch.
    pub fn decode(&self, token: &str) -> AppResult<OAuthState> {
        let claims = decode::<StateClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "OAuth state cookie rejected");
                state_mismatch()
            })?
            .claims;
        Ok(OAuthState {
            state: claims.state,
            nonce: claims.nonce,
        })
    }
}

/// The 400 raised for any missing, expired, or mismatched state.
pub fn state_mismatch() -> AppError {
    AppError::validation(codes::OAUTH_STATE_MISMATCH, "OAuth state mismatch")
}

fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use authz_core::config::SessionConfig;
    use authz_core::error::ErrorKind;

    use crate::session::SessionManager;

    #[test]
    fn test_round_trip() {
        let manager = OAuthStateManager::new("secret", 600);
        let state = manager.generate();
        assert_ne!(state.state, state.nonce);
        assert_eq!(state.state.len(), 43);

        let cookie = manager.encode(&state).unwrap();
        assert_eq!(manager.decode(&cookie).unwrap(), state);
    }

    #[test]
    fn test_wrong_secret_is_mismatch() {
        let cookie = OAuthStateManager::new("a", 600)
            .encode(&OAuthState {
                state: "s".into(),
                nonce: "n".into(),
            })
            .unwrap();
        let err = OAuthStateManager::new("b", 600).decode(&cookie).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.code, codes::OAUTH_STATE_MISMATCH);
    }

    #[test]
    fn test_expired_state_is_mismatch() {
        let manager = OAuthStateManager::new("secret", 0);
        let claims = StateClaims {
            state: "s".into(),
            nonce: "n".into(),
            aud: STATE_AUDIENCE.into(),
            exp: Utc::now().timestamp() - 5,
        };
        let cookie = encode(&Header::new(Algorithm::HS256), &claims, &manager.encoding_key).unwrap();
        assert!(manager.decode(&cookie).is_err());
    }

    #[test]
    fn test_state_and_session_tokens_do_not_cross() {
        let secret = "shared-secret";
        let states = OAuthStateManager::new(secret, 600);
        let sessions = SessionManager::new(&SessionConfig {
            signing_secret: secret.into(),
            ..Default::default()
        });

        let state_cookie = states.encode(&states.generate()).unwrap();
        assert!(sessions.decode(&state_cookie).is_err());

        let session_token = sessions
            .encode(&sessions.create_session("s", "a@example.com", "auth:a@example.com"))
            .unwrap();
        assert!(states.decode(&session_token).is_err());
    }
}
