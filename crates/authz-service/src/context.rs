//! Per-request context carrying the caller's network origin.

use std::net::IpAddr;

use chrono::{DateTime, Utc};

/// Context for one inbound request, built by the HTTP layer.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Caller address, when it could be determined.
    pub client_ip: Option<IpAddr>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context stamped with the current time.
    pub fn new(client_ip: Option<IpAddr>) -> Self {
        Self {
            client_ip,
            request_time: Utc::now(),
        }
    }

    /// Key used by the rate limiter; unknown callers share one bucket.
    pub fn rate_key(&self) -> String {
        match self.client_ip {
            Some(ip) => ip.to_string(),
            None => "unknown".to_string(),
        }
    }
}
