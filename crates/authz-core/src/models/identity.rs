//! Resolved caller identity.

use serde::{Deserialize, Serialize};

/// Which credential type established the identity. Used for decision
/// logging only, never for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    /// Internal signed session.
    Session,
    /// OAuth access token.
    AccessToken,
    /// OAuth identity token.
    IdToken,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Session => write!(f, "session"),
            Self::AccessToken => write!(f, "access_token"),
            Self::IdToken => write!(f, "id_token"),
        }
    }
}

/// Output of identity resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    /// Canonical lowercase email.
    pub email: String,
    /// Cache key for the profile.
    pub cache_key: String,
    /// Credential type used.
    pub source: CredentialSource,
    /// Upstream subject id, when the credential carried one.
    pub subject: Option<String>,
}

impl ResolvedIdentity {
    /// Canonical cache key for an email.
    pub fn cache_key_for(email: &str) -> String {
        format!("auth:{email}")
    }

    /// Identity derived from a token, keyed by its canonical email.
    pub fn from_email(email: &str, source: CredentialSource, subject: Option<String>) -> Self {
        let email = email.trim().to_lowercase();
        Self {
            cache_key: Self::cache_key_for(&email),
            email,
            source,
            subject,
        }
    }
}
