//! Domain models shared by every gateway crate.

pub mod effective_auth;
pub mod identity;
pub mod session;

pub use effective_auth::{CacheRecord, CacheStatus, DirectoryProfile, EffectiveAuth};
pub use identity::{CredentialSource, ResolvedIdentity};
pub use session::InternalSession;
