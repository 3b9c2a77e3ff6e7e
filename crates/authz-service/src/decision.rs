//! Permission-check evaluation against a cached profile.

use serde::Serialize;

use authz_core::error::{AppError, codes};
use authz_core::models::EffectiveAuth;
use authz_core::result::AppResult;
use authz_directory::slugify;

/// The RBAC verbs a permission check may ask about.
pub const RBAC_VERBS: [&str; 7] = ["create", "read", "update", "delete", "list", "approve", "manage"];

/// Machine-readable reason attached to every denial.
pub const PERMISSION_MISSING: &str = codes::PERMISSION_MISSING;

/// A validated `(module, action)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCheck {
    /// Slugified module.
    pub module: String,
    /// Lowercased RBAC verb.
    pub action: String,
}

impl PermissionCheck {
    /// Normalize and validate a requested check.
    pub fn new(module: &str, action: &str) -> AppResult<Self> {
        let module = slugify(module);
        if module.is_empty() {
            return Err(AppError::validation(codes::INVALID_MODULE, "Module must not be empty"));
        }

        let action = action.trim().to_lowercase();
        if !RBAC_VERBS.contains(&action.as_str()) {
            return Err(AppError::validation(
                codes::INVALID_ACTION,
                format!("Unsupported action '{action}'. Allowed: {}", RBAC_VERBS.join(", ")),
            ));
        }

        Ok(Self { module, action })
    }

    /// `module:action`.
    pub fn permission(&self) -> String {
        format!("{}:{}", self.module, self.action)
    }
}

/// Outcome of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The evaluated permission is held.
    Granted,
    /// It is not.
    Denied,
}

/// Full decision payload, returned for both grants and denials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionDecision {
    /// Whether access is granted.
    pub authorized: bool,
    /// `granted` or `denied`.
    pub decision: Decision,
    /// Set on denial.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    /// Canonical email evaluated.
    pub email: String,
    /// Normalized module.
    pub module: String,
    /// Normalized action.
    pub action: String,
    /// `module:action`.
    pub evaluated_permission: String,
    /// Sorted permissions the profile holds for this module.
    pub permitted_actions: Vec<String>,
}

/// Evaluate a check against a profile.
pub fn evaluate(auth: &EffectiveAuth, check: &PermissionCheck) -> PermissionDecision {
    let evaluated_permission = check.permission();
    let permitted_actions = auth.permissions_for_module(&check.module);
    let authorized = permitted_actions.contains(&evaluated_permission);

    PermissionDecision {
        authorized,
        decision: if authorized {
            Decision::Granted
        } else {
            Decision::Denied
        },
        reason: (!authorized).then_some(PERMISSION_MISSING),
        email: auth.email.clone(),
        module: check.module.clone(),
        action: check.action.clone(),
        evaluated_permission,
        permitted_actions,
    }
}
