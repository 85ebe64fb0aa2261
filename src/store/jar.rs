//! Netscape `cookies.txt` jar.
//!
//! The format browsers export and `curl -c` writes: one cookie per line,
//! seven tab-separated fields
//!
//! ```text
//! domain  include_subdomains  path  secure  expires  name  value
//! ```
//!
//! Lines starting with `#HttpOnly_` are HttpOnly cookies; any other line
//! starting with `#` is a comment. Unparseable lines are skipped with a
//! warning when listing and left untouched when removing.

use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use super::cookie::{Cookie, CookieId, CookieStore};
use crate::error::CookieLensError;

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

/// A cookie jar file on disk.
#[derive(Debug, Clone)]
pub struct NetscapeJar {
    path: PathBuf,
    store_id: String,
}

impl NetscapeJar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let store_id = path.display().to_string();
        Self { path, store_id }
    }

    fn read(&self) -> Result<String, CookieLensError> {
        fs::read_to_string(&self.path).map_err(|e| self.error(e.to_string()))
    }

    fn error(&self, reason: String) -> CookieLensError {
        CookieLensError::JarError {
            path: self.path.display().to_string(),
            reason,
        }
    }
}

impl CookieStore for NetscapeJar {
    fn list_all(&self) -> Result<Vec<Cookie>, CookieLensError> {
        let contents = self.read()?;
        let mut cookies = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            match parse_line(line, &self.store_id) {
                Ok(Some(cookie)) => cookies.push(cookie),
                Ok(None) => {}
                Err(reason) => warn!(line = index + 1, %reason, "skipping cookie jar line"),
            }
        }
        cookies.sort_by(|a, b| a.domain.cmp(&b.domain).then_with(|| a.name.cmp(&b.name)));
        Ok(cookies)
    }

    fn remove(&mut self, id: &CookieId) -> Result<bool, CookieLensError> {
        let contents = self.read()?;
        let mut removed = 0usize;
        let mut kept = String::with_capacity(contents.len());
        for line in contents.lines() {
            let matches = matches!(parse_line(line, &self.store_id), Ok(Some(ref c)) if c.matches(id));
            if matches {
                removed += 1;
            } else {
                kept.push_str(line);
                kept.push('\n');
            }
        }

        if removed == 0 {
            return Ok(false);
        }
        fs::write(&self.path, kept).map_err(|e| self.error(e.to_string()))?;
        info!(cookie = %id, removed, "removed cookie from jar");
        Ok(true)
    }
}

/// Parse one jar line. `Ok(None)` for blank lines and comments.
fn parse_line(line: &str, store_id: &str) -> Result<Option<Cookie>, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (line, http_only) = match line.strip_prefix(HTTP_ONLY_PREFIX) {
        Some(rest) => (rest, true),
        None => (line, false),
    };
    if line.trim().is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split('\t').collect();
    let [domain, include_subdomains, path, secure, expires, name, value] = fields[..] else {
        return Err(format!("expected 7 tab-separated fields, found {}", fields.len()));
    };

    Ok(Some(Cookie {
        domain: domain.to_string(),
        include_subdomains: parse_flag(include_subdomains)?,
        path: path.to_string(),
        secure: parse_flag(secure)?,
        http_only,
        expires: expires
            .parse()
            .map_err(|_| format!("invalid expiry '{expires}'"))?,
        name: name.to_string(),
        value: value.to_string(),
        store_id: store_id.to_string(),
    }))
}

fn parse_flag(field: &str) -> Result<bool, String> {
    if field.eq_ignore_ascii_case("TRUE") {
        Ok(true)
    } else if field.eq_ignore_ascii_case("FALSE") {
        Ok(false)
    } else {
        Err(format!("invalid boolean '{field}'"))
    }
}
