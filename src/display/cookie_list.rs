//! Cookie listing output.

use colored::Colorize;
use serde::Serialize;

use crate::store::cookie::Cookie;

const EMPTY_MESSAGE: &str = "No cookies found matching your criteria.";

/// Render one row per cookie: domain, name, then `Token`/`HttpOnly` chips.
pub fn render_cookie_list(cookies: &[&Cookie], use_color: bool) -> String {
    if cookies.is_empty() {
        return EMPTY_MESSAGE.to_string();
    }

    let domain_width = cookies.iter().map(|c| c.domain.chars().count()).max().unwrap_or(0);
    let name_width = cookies.iter().map(|c| c.name.chars().count()).max().unwrap_or(0);

    cookies
        .iter()
        .map(|cookie| {
            let mut row = format!(
                "{:domain_width$}  {:name_width$}",
                cookie.domain, cookie.name
            );
            for chip in chips(cookie) {
                row.push_str("  ");
                row.push_str(&paint_chip(chip, use_color));
            }
            row.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn chips(cookie: &Cookie) -> Vec<&'static str> {
    let mut chips = Vec::new();
    if cookie.looks_like_token() {
        chips.push("Token");
    }
    if cookie.http_only {
        chips.push("HttpOnly");
    }
    chips
}

fn paint_chip(chip: &str, use_color: bool) -> String {
    let text = format!("[{chip}]");
    if !use_color {
        return text;
    }
    match chip {
        "Token" => text.green().bold().to_string(),
        _ => text.yellow().to_string(),
    }
}

/// JSON entry for a cookie. `value` is only filled in when one cookie is
/// shown on purpose.
#[derive(Debug, Serialize)]
struct ListedCookie<'a> {
    domain: &'a str,
    name: &'a str,
    path: &'a str,
    secure: bool,
    http_only: bool,
    expires: u64,
    url: String,
    token: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a str>,
}

impl<'a> ListedCookie<'a> {
    fn new(cookie: &'a Cookie, with_value: bool) -> Self {
        Self {
            domain: &cookie.domain,
            name: &cookie.name,
            path: &cookie.path,
            secure: cookie.secure,
            http_only: cookie.http_only,
            expires: cookie.expires,
            url: cookie.url(),
            token: cookie.looks_like_token(),
            value: with_value.then_some(cookie.value.as_str()),
        }
    }
}

/// Listing as a JSON array. Values are left out.
pub fn render_cookie_list_json(cookies: &[&Cookie]) -> String {
    let listed: Vec<ListedCookie<'_>> = cookies.iter().map(|c| ListedCookie::new(c, false)).collect();
    serde_json::to_string_pretty(&listed).unwrap_or_else(|_| "[]".to_string())
}

/// A single cookie as JSON, value included.
pub fn render_cookie_json(cookie: &Cookie) -> String {
    serde_json::to_string_pretty(&ListedCookie::new(cookie, true)).unwrap_or_else(|_| "{}".to_string())
}
