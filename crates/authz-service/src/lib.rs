//! # authz-service
//!
//! Use-case layer of the gateway. Services follow constructor injection:
//! every collaborator (cache, directory, limiter, token verifier) is handed
//! in as an `Arc` at startup.
//!
//! - `effective_auth`: cache-aside profile resolution with warm refresh
//! - `decision`: RBAC verb validation and permission evaluation
//! - `pipeline`: guard → rate → resolve → cache → evaluate orchestration

pub mod context;
pub mod decision;
pub mod effective_auth;
pub mod pipeline;
pub mod retry;

pub use context::RequestContext;
pub use decision::{Decision, PermissionCheck, PermissionDecision};
pub use effective_auth::{EffectiveAuthResolver, ResolvedProfile};
pub use pipeline::{AuthorizationPipeline, CheckOutcome, ProfileOutcome};
pub use retry::RetryPolicy;
