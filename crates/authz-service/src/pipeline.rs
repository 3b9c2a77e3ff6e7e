//! Guard → rate → resolve → cache → evaluate orchestration.
//!
//! Guard failures short-circuit before any identity or cache work.

use std::sync::Arc;

use tracing::{info, warn};

use authz_auth::{Credential, IdentityResolver, NetworkAcl};
use authz_core::error::{AppError, codes};
use authz_core::models::{InternalSession, ResolvedIdentity};
use authz_core::result::AppResult;
use authz_core::traits::rate_limit::RateLimiter;

use crate::context::RequestContext;
use crate::decision::{PermissionCheck, PermissionDecision, evaluate};
use crate::effective_auth::{EffectiveAuthResolver, ResolvedProfile};

/// Profile-fetch result with the identity that produced it.
#[derive(Debug, Clone)]
pub struct ProfileOutcome {
    /// Who was resolved.
    pub identity: ResolvedIdentity,
    /// Their profile and cache status.
    pub profile: ResolvedProfile,
}

/// Permission-check result.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// Who was resolved.
    pub identity: ResolvedIdentity,
    /// Cache status of the profile evaluated.
    pub profile: ResolvedProfile,
    /// The decision.
    pub decision: PermissionDecision,
}

/// The decision pipeline shared by every privileged endpoint.
#[derive(Debug, Clone)]
pub struct AuthorizationPipeline {
    acl: Arc<NetworkAcl>,
    limiter: Arc<dyn RateLimiter>,
    identity: IdentityResolver,
    profiles: EffectiveAuthResolver,
}

impl AuthorizationPipeline {
    /// Creates the pipeline.
    pub fn new(
        acl: Arc<NetworkAcl>,
        limiter: Arc<dyn RateLimiter>,
        identity: IdentityResolver,
        profiles: EffectiveAuthResolver,
    ) -> Self {
        Self {
            acl,
            limiter,
            identity,
            profiles,
        }
    }

    /// Identity resolver.
    pub fn identity(&self) -> &IdentityResolver {
        &self.identity
    }

    /// Profile resolver.
    pub fn profiles(&self) -> &EffectiveAuthResolver {
        &self.profiles
    }

    /// Network admission then rate limiting.
    pub async fn admit(&self, ctx: &RequestContext) -> AppResult<()> {
        let allowed = match ctx.client_ip {
            Some(ip) => self.acl.is_allowed_ip(ip),
            None => self.acl.allows_all(),
        };
        if !allowed {
            warn!(client_ip = ?ctx.client_ip, "Network not allowed");
            return Err(AppError::authorization(
                codes::NETWORK_NOT_ALLOWED,
                "Network not allowed",
            ));
        }

        let key = ctx.rate_key();
        if !self.limiter.allow(&key).await? {
            warn!(rate_key = %key, "Rate limit exceeded");
            return Err(AppError::rate_limited("Too many requests"));
        }
        Ok(())
    }

    /// `/authz`: admit, resolve, and serve the profile.
    pub async fn fetch_profile(
        &self,
        ctx: &RequestContext,
        credential: &Credential,
    ) -> AppResult<ProfileOutcome> {
        self.admit(ctx).await?;
        let identity = self.identity.resolve(credential).await?;
        let profile = self.profiles.resolve(&identity).await?;

        info!(
            email = %identity.email,
            source = %identity.source,
            cache_status = %profile.cache_status,
            "Authorization profile served"
        );
        Ok(ProfileOutcome { identity, profile })
    }

    /// `/authz/check`: admit, validate the check, resolve, and evaluate.
    pub async fn check_permission(
        &self,
        ctx: &RequestContext,
        credential: &Credential,
        module: &str,
        action: &str,
    ) -> AppResult<CheckOutcome> {
        self.admit(ctx).await?;
        let check = PermissionCheck::new(module, action)?;
        let identity = self.identity.resolve(credential).await?;
        let profile = self.profiles.resolve(&identity).await?;
        let decision = evaluate(&profile.effective_auth, &check);

        info!(
            email = %identity.email,
            source = %identity.source,
            cache_status = %profile.cache_status,
            permission = %decision.evaluated_permission,
            decision = if decision.authorized { "granted" } else { "denied" },
            "Authorization decision"
        );
        Ok(CheckOutcome {
            identity,
            profile,
            decision,
        })
    }

    /// Session-cookie endpoints: admit, decode the session, and serve its profile.
    ///
    /// A missing cookie is reported only after the guards have run.
    pub async fn session_profile(
        &self,
        ctx: &RequestContext,
        token: Option<&str>,
        force_refresh: bool,
    ) -> AppResult<(InternalSession, ProfileOutcome)> {
        self.admit(ctx).await?;
        let token = token.ok_or_else(|| {
            AppError::authentication(codes::MISSING_SESSION, "Session cookie is required")
        })?;
        let (identity, session) = self.identity.resolve_session(token)?;
        let profile = if force_refresh {
            self.profiles.force_refresh(&identity).await?
        } else {
            self.profiles.resolve(&identity).await?
        };

        info!(
            email = %identity.email,
            source = %identity.source,
            cache_status = %profile.cache_status,
            "Session profile served"
        );
        Ok((session, ProfileOutcome { identity, profile }))
    }
}
