//! The exactly-one-of-three credential payload.

use serde::Deserialize;

use authz_core::error::{AppError, codes};
use authz_core::models::CredentialSource;

/// Raw credential fields as they appear in a request body.
///
/// Blank strings count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialFields {
    /// Internal session token.
    #[serde(default)]
    pub session_token: Option<String>,
    /// OAuth access token.
    #[serde(default)]
    pub access_token: Option<String>,
    /// OAuth identity token.
    #[serde(default)]
    pub id_token: Option<String>,
    /// OAuth state to match against the identity token.
    #[serde(default)]
    pub state: Option<String>,
    /// OAuth nonce to match against the identity token.
    #[serde(default)]
    pub nonce: Option<String>,
}

/// Exactly one caller credential.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "CredentialFields")]
pub enum Credential {
    /// Signed internal session token.
    Session(String),
    /// OAuth access token.
    AccessToken(String),
    /// OAuth identity token, optionally with the state/nonce of its login.
    IdToken {
        /// Raw token.
        token: String,
        /// Expected `state` claim.
        state: Option<String>,
        /// Expected `nonce` claim.
        nonce: Option<String>,
    },
}

impl Credential {
    /// Source label for decision logging.
    pub fn source(&self) -> CredentialSource {
        match self {
            Self::Session(_) => CredentialSource::Session,
            Self::AccessToken(_) => CredentialSource::AccessToken,
            Self::IdToken { .. } => CredentialSource::IdToken,
        }
    }
}

impl TryFrom<CredentialFields> for Credential {
    type Error = AppError;

    fn try_from(fields: CredentialFields) -> Result<Self, Self::Error> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let session = present(fields.session_token);
        let access = present(fields.access_token);
        let id = present(fields.id_token);

        match (session, access, id) {
            (Some(token), None, None) => Ok(Self::Session(token)),
            (None, Some(token), None) => Ok(Self::AccessToken(token)),
            (None, None, Some(token)) => Ok(Self::IdToken {
                token,
                state: present(fields.state),
                nonce: present(fields.nonce),
            }),
            _ => Err(AppError::validation(
                codes::INVALID_CREDENTIALS,
                "Provide exactly one of session_token, access_token, or id_token",
            )),
        }
    }
}
