//! Cookie attribute policy shared by the session and OAuth state cookies.

use std::fmt;

/// `SameSite` attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSitePolicy {
    /// `SameSite=Lax`.
    Lax,
    /// `SameSite=Strict`.
    Strict,
    /// `SameSite=None` (requires `Secure`).
    None,
}

impl fmt::Display for SameSitePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lax => write!(f, "Lax"),
            Self::Strict => write!(f, "Strict"),
            Self::None => write!(f, "None"),
        }
    }
}

/// Resolved `Secure` and `SameSite` attributes for gateway cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    /// Whether cookies carry `Secure`.
    pub secure: bool,
    /// Resolved `SameSite` policy.
    pub same_site: SameSitePolicy,
}

impl CookiePolicy {
    /// Resolve the policy from the configured `SameSite` string.
    ///
    /// Empty resolves to `None` when secure, else `Lax`. A secure deployment
    /// configured with `lax` is escalated to `None` so the cookie survives the
    /// cross-site OAuth redirect. Unknown values fall back to `Lax`.
    pub fn new(secure: bool, same_site: &str) -> Self {
        let requested = same_site.trim().to_lowercase();
        let same_site = match requested.as_str() {
            "" if secure => SameSitePolicy::None,
            "" => SameSitePolicy::Lax,
            "strict" => SameSitePolicy::Strict,
            "none" if secure => SameSitePolicy::None,
            "lax" if secure => SameSitePolicy::None,
            _ => SameSitePolicy::Lax,
        };
        Self { secure, same_site }
    }

    /// `Set-Cookie` value issuing `name=value` for `max_age_seconds`.
    pub fn set_cookie(&self, name: &str, value: &str, max_age_seconds: u64) -> String {
        let mut cookie = format!(
            "{name}={value}; Path=/; Max-Age={max_age_seconds}; HttpOnly; SameSite={}",
            self.same_site
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// `Set-Cookie` value deleting `name`.
    pub fn clear_cookie(&self, name: &str) -> String {
        self.set_cookie(name, "", 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_site_resolution() {
        assert_eq!(CookiePolicy::new(false, "").same_site, SameSitePolicy::Lax);
        assert_eq!(CookiePolicy::new(true, "").same_site, SameSitePolicy::None);
        assert_eq!(CookiePolicy::new(true, "lax").same_site, SameSitePolicy::None);
        assert_eq!(CookiePolicy::new(false, "LAX").same_site, SameSitePolicy::Lax);
        assert_eq!(CookiePolicy::new(true, "strict").same_site, SameSitePolicy::Strict);
        assert_eq!(CookiePolicy::new(false, "none").same_site, SameSitePolicy::Lax);
    }

    #[test]
    fn test_set_cookie_attributes() {
        let header = CookiePolicy::new(true, "strict").set_cookie("ga_session", "tok", 3600);
        assert_eq!(
            header,
            "ga_session=tok; Path=/; Max-Age=3600; HttpOnly; SameSite=Strict; Secure"
        );

        let local = CookiePolicy::new(false, "lax").set_cookie("ga_session", "tok", 60);
        assert!(local.contains("HttpOnly"));
        assert!(!local.contains("Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let header = CookiePolicy::new(false, "lax").clear_cookie("ga_session");
        assert!(header.starts_with("ga_session=; Path=/; Max-Age=0"));
    }
}
