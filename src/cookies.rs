// src/cookies.rs
// =============================================================================
// A per-host cookie table.
//
// The table maps a host name ("www.example.com") to the list of cookies the
// robot should send to that host. It is a plain table:
// - no expiry, no path scoping, no Secure/HttpOnly handling
// - setting cookies for a host REPLACES the previous list (no merging)
//
// The HTTP client consults this table before every request and records the
// Set-Cookie headers of every response, through reqwest's CookieStore trait.
//
// Rust concepts:
// - Mutex: Many workers share one table, so every access takes the lock
// - Traits: Implementing reqwest::cookie::CookieStore plugs us into the client
// =============================================================================

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use url::Url;

// One cookie: just a name and a value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    // Parses "name=value", also accepting the attribute tail of a
    // Set-Cookie header ("name=value; Path=/; HttpOnly"), which is ignored.
    //
    // Returns None when there is no '=' or the name is empty.
    pub fn parse(s: &str) -> Option<Self> {
        let pair = s.split(';').next()?.trim();
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, value.trim()))
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

#[derive(Debug, Default)]
pub struct CookieStore {
    cookies: Mutex<HashMap<String, Vec<Cookie>>>,
}

impl CookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Replaces the stored cookie list for `host`
    pub fn set_cookies(&self, host: &str, cookies: Vec<Cookie>) {
        self.lock().insert(host.to_string(), cookies);
    }

    // Returns the stored cookie list for `host`, empty if none was set
    pub fn cookies_for(&self, host: &str) -> Vec<Cookie> {
        self.lock().get(host).cloned().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Cookie>>> {
        // insert/get are single operations, a poisoned table is still whole
        self.cookies.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// Builds the value of a `Cookie:` request header: "a=1; b=2"
fn cookie_header(cookies: &[Cookie]) -> String {
    cookies
        .iter()
        .map(Cookie::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl reqwest::cookie::CookieStore for CookieStore {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let Some(host) = url.host_str() else {
            return;
        };

        let cookies: Vec<Cookie> = cookie_headers
            .map(|header| String::from_utf8_lossy(header.as_bytes()).into_owned())
            .filter_map(|line| Cookie::parse(&line))
            .collect();

        // Only a response that actually carries cookies replaces the entry
        if !cookies.is_empty() {
            log::debug!("Storing {} cookie(s) for {}", cookies.len(), host);
            CookieStore::set_cookies(self, host, cookies);
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let host = url.host_str()?;
        let cookies = self.cookies_for(host);
        if cookies.is_empty() {
            return None;
        }
        HeaderValue::from_bytes(cookie_header(&cookies).as_bytes()).ok()
    }
}
