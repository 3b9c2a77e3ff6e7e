//! Network admission control.

pub mod acl;

pub use acl::NetworkAcl;
