//! OAuth token verification contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Verified claims from an OAuth identity token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Subject id.
    pub sub: String,
    /// Email claim.
    #[serde(default)]
    pub email: Option<String>,
    /// Hosted domain claim.
    #[serde(default)]
    pub hd: Option<String>,
    /// Nonce echoed from the authorization request.
    #[serde(default)]
    pub nonce: Option<String>,
    /// State, when the provider echoes it.
    #[serde(default)]
    pub state: Option<String>,
}

/// Token introspection response for an access token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Subject id.
    #[serde(default)]
    pub sub: Option<String>,
    /// Email, when the token carries the email scope.
    #[serde(default)]
    pub email: Option<String>,
    /// Hosted domain.
    #[serde(default)]
    pub hd: Option<String>,
    /// Audience the token was issued to.
    #[serde(default)]
    pub aud: Option<String>,
}

/// User-info endpoint response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Subject id.
    #[serde(default)]
    pub sub: Option<String>,
    /// Email.
    #[serde(default)]
    pub email: Option<String>,
    /// Hosted domain.
    #[serde(default)]
    pub hd: Option<String>,
}

impl TokenInfo {
    /// Fill empty fields from the user-info response.
    pub fn merge_user_info(&mut self, info: UserInfo) {
        if self.sub.is_none() {
            self.sub = info.sub;
        }
        if self.email.is_none() {
            self.email = info.email;
        }
        if self.hd.is_none() {
            self.hd = info.hd;
        }
    }
}

/// Upstream token verification collaborator.
#[async_trait]
pub trait TokenVerifier: Send + Sync + 'static {
    /// Verify signature, issuer, expiry, and audience of an identity token.
    async fn verify_id_token(&self, raw: &str) -> AppResult<IdTokenClaims>;

    /// Introspect an access token at the token-info endpoint.
    async fn introspect_access_token(&self, token: &str) -> AppResult<TokenInfo>;

    /// Fetch the user-info document for an access token.
    async fn fetch_user_info(&self, token: &str) -> AppResult<UserInfo>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_existing_fields() {
        let mut info = TokenInfo {
            sub: Some("123".into()),
            ..Default::default()
        };
        info.merge_user_info(UserInfo {
            sub: Some("999".into()),
            email: Some("a@example.com".into()),
            hd: None,
        });
        assert_eq!(info.sub.as_deref(), Some("123"));
        assert_eq!(info.email.as_deref(), Some("a@example.com"));
        assert!(info.hd.is_none());
    }
}
