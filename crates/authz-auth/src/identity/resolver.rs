//! Three-way identity resolution.
//!
//! Turns one [`Credential`] into a canonical email, cache key, and source
//! label. Upstream calls go through the [`TokenVerifier`] collaborator; no
//! lock is held while they are in flight.

use std::sync::Arc;

use tracing::{debug, warn};

use authz_core::error::{AppError, codes};
use authz_core::models::{CredentialSource, InternalSession, ResolvedIdentity};
use authz_core::result::AppResult;
use authz_core::traits::token::{IdTokenClaims, TokenVerifier};

use crate::oauth::OAuthState;
use crate::oauth::state::state_mismatch;
use crate::session::SessionManager;

use super::credential::Credential;

/// Resolves caller identity from sessions, access tokens, and ID tokens.
#[derive(Clone)]
pub struct IdentityResolver {
    sessions: SessionManager,
    verifier: Arc<dyn TokenVerifier>,
    /// Lowercased hosted domain every identity must belong to.
    allowed_hosted_domain: Option<String>,
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("sessions", &self.sessions)
            .field("allowed_hosted_domain", &self.allowed_hosted_domain)
            .finish_non_exhaustive()
    }
}

impl IdentityResolver {
    /// Creates a resolver.
    pub fn new(
        sessions: SessionManager,
        verifier: Arc<dyn TokenVerifier>,
        allowed_hosted_domain: Option<String>,
    ) -> Self {
        Self {
            sessions,
            verifier,
            allowed_hosted_domain: allowed_hosted_domain
                .map(|d| d.trim().to_lowercase())
                .filter(|d| !d.is_empty()),
        }
    }

    /// The session codec used for session credentials.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Resolve any credential.
    pub async fn resolve(&self, credential: &Credential) -> AppResult<ResolvedIdentity> {
        match credential {
            Credential::Session(token) => self.resolve_session(token).map(|(identity, _)| identity),
            Credential::AccessToken(token) => self.resolve_access_token(token).await,
            Credential::IdToken { token, state, nonce } => {
                let expected = match (state, nonce) {
                    (None, None) => None,
                    _ => Some(ExpectedState {
                        state: state.as_deref(),
                        nonce: nonce.as_deref(),
                    }),
                };
                self.resolve_id_token_with(token, expected)
                    .await
                    .map(|(identity, _)| identity)
            }
        }
    }

    /// Decode a session token. The session's own cache key is kept.
    pub fn resolve_session(&self, token: &str) -> AppResult<(ResolvedIdentity, InternalSession)> {
        let session = self.sessions.decode(token)?;
        let identity = ResolvedIdentity {
            email: session.email.clone(),
            cache_key: session.cache_key.clone(),
            source: CredentialSource::Session,
            subject: Some(session.subject.clone()),
        };
        Ok((identity, session))
    }

    /// Verify an ID token from the login callback, binding it to the state cookie.
    ///
    /// The `nonce` claim must equal the cookie's nonce; a `state` claim, when
    /// the provider echoes one, must equal the cookie's state.
    pub async fn resolve_login(
        &self,
        raw: &str,
        expected: &OAuthState,
    ) -> AppResult<(ResolvedIdentity, IdTokenClaims)> {
        let (identity, claims) = self
            .resolve_id_token_with(
                raw,
                Some(ExpectedState {
                    state: Some(&expected.state),
                    nonce: Some(&expected.nonce),
                }),
            )
            .await?;
        if claims.nonce.as_deref() != Some(expected.nonce.as_str()) {
            warn!(email = %identity.email, "ID token nonce missing from login response");
            return Err(state_mismatch());
        }
        Ok((identity, claims))
    }

    async fn resolve_id_token_with(
        &self,
        raw: &str,
        expected: Option<ExpectedState<'_>>,
    ) -> AppResult<(ResolvedIdentity, IdTokenClaims)> {
        let claims = self.verifier.verify_id_token(raw).await?;

        let email = claims
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::validation(codes::MISSING_CLAIMS, "ID token has no email claim"))?;

        self.check_hosted_domain(claims.hd.as_deref(), email)?;

        if let Some(expected) = expected {
            if let (Some(want), Some(got)) = (expected.state, claims.state.as_deref())
                && want != got
            {
                return Err(state_mismatch());
            }
            if let (Some(want), Some(got)) = (expected.nonce, claims.nonce.as_deref())
                && want != got
            {
                return Err(state_mismatch());
            }
        }

        let identity =
            ResolvedIdentity::from_email(email, CredentialSource::IdToken, Some(claims.sub.clone()));
        debug!(email = %identity.email, "Resolved identity from ID token");
        Ok((identity, claims))
    }

    /// Introspect an access token, falling back to user-info for the email.
    pub async fn resolve_access_token(&self, token: &str) -> AppResult<ResolvedIdentity> {
        let mut info = self.verifier.introspect_access_token(token).await?;
        if info.email.as_deref().is_none_or(|e| e.trim().is_empty()) {
            debug!("Token info lacks email; consulting user-info");
            info.email = None;
            let user_info = self.verifier.fetch_user_info(token).await?;
            info.merge_user_info(user_info);
        }

        let email = info
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| {
                AppError::authentication(codes::INVALID_ACCESS_TOKEN, "Access token carries no email")
            })?;

        if let Some(domain) = &self.allowed_hosted_domain
            && !email_in_domain(email, domain)
        {
            return Err(domain_not_allowed());
        }

        let identity = ResolvedIdentity::from_email(email, CredentialSource::AccessToken, info.sub);
        debug!(email = %identity.email, "Resolved identity from access token");
        Ok(identity)
    }

    /// A present `hd` claim must match; without one the email's domain must.
    fn check_hosted_domain(&self, hd: Option<&str>, email: &str) -> AppResult<()> {
        let Some(domain) = &self.allowed_hosted_domain else {
            return Ok(());
        };
        let allowed = match hd.map(str::trim).filter(|h| !h.is_empty()) {
            Some(hd) => hd.eq_ignore_ascii_case(domain),
            None => email_in_domain(email, domain),
        };
        if allowed {
            Ok(())
        } else {
            Err(domain_not_allowed())
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ExpectedState<'a> {
    state: Option<&'a str>,
    nonce: Option<&'a str>,
}

fn email_in_domain(email: &str, domain: &str) -> bool {
    email
        .trim()
        .to_lowercase()
        .rsplit_once('@')
        .is_some_and(|(_, d)| d == domain)
}

fn domain_not_allowed() -> AppError {
    AppError::authorization(codes::DOMAIN_NOT_ALLOWED, "Workspace domain is not allowed")
}
