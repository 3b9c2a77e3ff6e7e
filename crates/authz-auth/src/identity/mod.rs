//! Credential union and identity resolution.

pub mod credential;
pub mod resolver;

pub use credential::{Credential, CredentialFields};
pub use resolver::IdentityResolver;
