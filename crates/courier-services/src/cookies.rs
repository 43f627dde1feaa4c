//! Cookie state
//!
//! All authorization state lives in cookies. `CookieStore` is the seam: the web
//! server uses `RequestCookies` (read from the `Cookie` header, writes collected as
//! `Set-Cookie` values) and the CLI and tests use `MemoryCookieStore`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Duration, Utc};

use crate::clock::{Clock, SystemClock};

/// A cookie to be written, with the attributes that go into `Set-Cookie`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Lifetime in seconds; `None` makes a session cookie
    pub max_age: Option<i64>,
    pub path: String,
    pub same_site: &'static str,
    pub http_only: bool,
    pub secure: bool,
}

impl Cookie {
    /// `Path=/; SameSite=Strict` session cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age: None,
            path: "/".to_string(),
            same_site: "Strict",
            http_only: false,
            secure: false,
        }
    }

    pub fn with_max_age(mut self, secs: i64) -> Self {
        self.max_age = Some(secs);
        self
    }

    /// Cookie that deletes `name` when written
    pub fn removal(name: impl Into<String>) -> Self {
        Self::new(name, "").with_max_age(0)
    }

    pub fn to_set_cookie_header(&self) -> String {
        let mut header = format!("{}={}; Path={}", self.name, self.value, self.path);
        if let Some(max_age) = self.max_age {
            header.push_str(&format!("; Max-Age={}", max_age));
        }
        header.push_str(&format!("; SameSite={}", self.same_site));
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        if self.secure {
            header.push_str("; Secure");
        }
        header
    }
}

pub trait CookieStore: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, cookie: Cookie);
    fn clear(&self, name: &str) {
        self.set(Cookie::removal(name));
    }
}

/// Parse a `Cookie` request header into name/value pairs. Malformed pairs are skipped.
pub fn parse_cookie_header(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

/// Cookies of one HTTP request plus the writes made while handling it.
#[derive(Debug, Default)]
pub struct RequestCookies {
    values: RwLock<HashMap<String, String>>,
    pending: Mutex<Vec<Cookie>>,
    http_only: bool,
    secure: bool,
}

impl RequestCookies {
    pub fn from_header(header: Option<&str>) -> Self {
        Self {
            values: RwLock::new(header.map(parse_cookie_header).unwrap_or_default()),
            ..Self::default()
        }
    }

    /// Mark every cookie written through this store `HttpOnly` and optionally `Secure`.
    pub fn with_attributes(mut self, http_only: bool, secure: bool) -> Self {
        self.http_only = http_only;
        self.secure = secure;
        self
    }

    /// `Set-Cookie` values for the response, in write order
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.pending
            .lock()
            .map(|pending| pending.iter().map(Cookie::to_set_cookie_header).collect())
            .unwrap_or_default()
    }
}

impl CookieStore for RequestCookies {
    fn get(&self, name: &str) -> Option<String> {
        self.values
            .read()
            .ok()
            .and_then(|values| values.get(name).cloned())
    }

    fn set(&self, mut cookie: Cookie) {
        cookie.http_only |= self.http_only;
        cookie.secure |= self.secure;

        if let Ok(mut values) = self.values.write() {
            if cookie.max_age.is_some_and(|age| age <= 0) {
                values.remove(&cookie.name);
            } else {
                values.insert(cookie.name.clone(), cookie.value.clone());
            }
        }
        if let Ok(mut pending) = self.pending.lock() {
            pending.push(cookie);
        }
    }
}

struct StoredCookie {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

/// In-process cookie jar honouring `Max-Age`.
pub struct MemoryCookieStore {
    cookies: RwLock<HashMap<String, StoredCookie>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            cookies: RwLock::new(HashMap::new()),
            clock,
        }
    }
}

impl Default for MemoryCookieStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieStore for MemoryCookieStore {
    fn get(&self, name: &str) -> Option<String> {
        let now = self.clock.now();
        let cookies = self.cookies.read().ok()?;
        cookies
            .get(name)
            .filter(|c| c.expires_at.map_or(true, |at| at > now))
            .map(|c| c.value.clone())
    }

    fn set(&self, cookie: Cookie) {
        let Ok(mut cookies) = self.cookies.write() else {
            return;
        };
        match cookie.max_age {
            Some(age) if age <= 0 => {
                cookies.remove(&cookie.name);
            }
            max_age => {
                let expires_at = max_age.map(|age| self.clock.now() + Duration::seconds(age));
                cookies.insert(
                    cookie.name,
                    StoredCookie {
                        value: cookie.value,
                        expires_at,
                    },
                );
            }
        }
    }
}
