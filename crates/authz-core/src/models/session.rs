//! Internal session payload.

use serde::{Deserialize, Serialize};

/// A signed, self-expiring internal session.
///
/// Never mutated after issuance; refresh issues a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalSession {
    /// Opaque unique token.
    pub session_id: String,
    /// Upstream identity subject id.
    pub subject: String,
    /// Canonical lowercase email.
    pub email: String,
    /// Cache key of the profile bound to this session.
    pub cache_key: String,
    /// Issue time, seconds since epoch.
    pub issued_at: i64,
    /// Expiry time, seconds since epoch.
    pub expires_at: i64,
}

impl InternalSession {
    /// Seconds left before expiry (may be negative).
    pub fn remaining_seconds(&self, now: i64) -> i64 {
        self.expires_at - now
    }
}
