//! Cookie records and the cookie store contract.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CookieLensError;

/// Values shorter than this are never offered for inspection.
const MIN_TOKEN_CANDIDATE_LEN: usize = 20;

/// Structured identity of a cookie for per-cookie settings.
///
/// Kept as a pair rather than a joined string so that a `_` or `|` in a
/// domain or name cannot make two cookies collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CookieId {
    pub domain: String,
    pub name: String,
}

impl CookieId {
    pub fn new(domain: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for CookieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.domain, self.name)
    }
}

/// A stored cookie.
///
/// `Debug` redacts the value, which frequently is a session token.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Cookie {
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    /// Unix timestamp; `0` for a session cookie.
    pub expires: u64,
    pub name: String,
    pub value: String,
    /// Identifier of the store the cookie came from.
    pub store_id: String,
}

impl Cookie {
    pub fn matches(&self, id: &CookieId) -> bool {
        self.domain == id.domain && self.name == id.name
    }

    /// URL the cookie is scoped to, as needed to remove it from a browser.
    pub fn url(&self) -> String {
        let host = self.domain.strip_prefix('.').unwrap_or(&self.domain);
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{host}{}", self.path)
    }

    pub fn looks_like_token(&self) -> bool {
        looks_like_token(&self.value)
    }
}

impl fmt::Debug for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cookie")
            .field("domain", &self.domain)
            .field("name", &self.name)
            .field("path", &self.path)
            .field("secure", &self.secure)
            .field("http_only", &self.http_only)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Display filter deciding whether a cookie value is worth inspecting.
///
/// This is a heuristic for the listing, not a structural check: it only
/// requires a `.` and more than 20 characters.
pub fn looks_like_token(value: &str) -> bool {
    value.contains('.') && value.chars().count() > MIN_TOKEN_CANDIDATE_LEN
}

/// Cookies whose name or domain contains `term`, ignoring case.
pub fn filter_cookies<'a>(cookies: &'a [Cookie], term: &str) -> Vec<&'a Cookie> {
    let term = term.to_lowercase();
    cookies
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&term) || c.domain.to_lowercase().contains(&term))
        .collect()
}

/// Where cookies are enumerated from and removed.
pub trait CookieStore {
    /// All cookies, sorted by domain.
    fn list_all(&self) -> Result<Vec<Cookie>, CookieLensError>;

    /// Remove the cookie identified by `id`. Returns whether anything was
    /// removed.
    fn remove(&mut self, id: &CookieId) -> Result<bool, CookieLensError>;

    /// Look up a single cookie.
    fn find(&self, id: &CookieId) -> Result<Cookie, CookieLensError> {
        self.list_all()?
            .into_iter()
            .find(|c| c.matches(id))
            .ok_or_else(|| CookieLensError::CookieNotFound {
                domain: id.domain.clone(),
                name: id.name.clone(),
            })
    }
}

#[cfg(test)]
pub(crate) fn sample_cookie(domain: &str, name: &str, value: &str) -> Cookie {
    Cookie {
        domain: domain.to_string(),
        include_subdomains: domain.starts_with('.'),
        path: "/".to_string(),
        secure: true,
        http_only: false,
        expires: 0,
        name: name.to_string(),
        value: value.to_string(),
        store_id: "0".to_string(),
    }
}
