//! `Cookie` header parsing and `Set-Cookie` header rendering.
//!
//! # Parsing
//!
//! The request header has the form `name1=value1; name2=value2`. It is read by
//! a four state scanner:
//!
//! - `Name`: collecting a cookie name, up to the first `=`
//! - `Value`: collecting the value, up to the next `;`
//! - `Separator`: just read `;`, a space must follow
//! - `Whitespace`: skipping spaces until the next name starts
//!
//! Parsing is all or nothing. Any character that is illegal in the current
//! state rejects the whole header and no pair is returned.
//!
//! # Rendering
//!
//! An outgoing [`Cookie`] renders as
//! `name=value[; Domain=d][; Path=p]; Expires=<RFC 1123 date>[; Secure][; HttpOnly]`.
//! `Expires` is relative: it is computed from the moment the header is rendered.

use std::collections::HashMap;
use std::mem;
use std::time::{Duration, SystemTime};

use httpdate::fmt_http_date;
use thiserror::Error;

use crate::ensure;

/// Default lifetime of an outgoing cookie, in seconds
pub const DEFAULT_EXPIRES_SECONDS: i64 = 3600;

/// Default `Path` attribute of an outgoing cookie
pub const DEFAULT_PATH: &str = "/";

/// 9999-12-31T23:59:59Z, the last instant before four digit years run out
const LATEST_HTTP_DATE_SECONDS: u64 = 253_402_300_799;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CookieError {
    #[error("unexpected `{ch}` at byte {position}")]
    UnexpectedChar { ch: char, position: usize },

    #[error("empty cookie name at byte {position}")]
    EmptyName { position: usize },

    #[error("missing space after `;` at byte {position}")]
    MissingSpace { position: usize },

    #[error("cookie `{name}` has no value")]
    MissingValue { name: String },

    #[error("header ends right after `;`")]
    Truncated,

    #[error("invalid cookie name `{name}`")]
    InvalidName { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Name,
    Value,
    Separator,
    Whitespace,
}

/// Parses a raw `Cookie` header value into name/value pairs.
///
/// A name seen twice keeps its last value.
pub fn parse_cookie_header(header: &str) -> Result<HashMap<String, String>, CookieError> {
    let mut cookies = HashMap::new();
    let mut name = String::new();
    let mut value = String::new();
    let mut state = ScanState::Name;

    for (position, ch) in header.char_indices() {
        state = match (state, ch) {
            (ScanState::Name, '=') => {
                ensure!(!name.is_empty(), CookieError::EmptyName { position });
                ScanState::Value
            }
            (ScanState::Name, ';') => return Err(CookieError::UnexpectedChar { ch, position }),
            (ScanState::Name, _) => {
                name.push(ch);
                ScanState::Name
            }

            (ScanState::Value, ';') => {
                cookies.insert(mem::take(&mut name), mem::take(&mut value));
                ScanState::Separator
            }
            (ScanState::Value, '=') => return Err(CookieError::UnexpectedChar { ch, position }),
            (ScanState::Value, _) => {
                value.push(ch);
                ScanState::Value
            }

            (ScanState::Separator, ' ') => ScanState::Whitespace,
            (ScanState::Separator, _) => return Err(CookieError::MissingSpace { position }),

            (ScanState::Whitespace, ' ') => ScanState::Whitespace,
            (ScanState::Whitespace, '=' | ';') => return Err(CookieError::UnexpectedChar { ch, position }),
            (ScanState::Whitespace, _) => {
                name.push(ch);
                ScanState::Name
            }
        };
    }

    match state {
        ScanState::Value => {
            cookies.insert(name, value);
        }
        ScanState::Name if name.is_empty() => {}
        ScanState::Name => return Err(CookieError::MissingValue { name }),
        ScanState::Whitespace => {}
        ScanState::Separator => return Err(CookieError::Truncated),
    }

    Ok(cookies)
}

/// Returns true if `name` can be used as a cookie name without breaking the header grammar
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|ch| matches!(ch, '=' | ';' | ' ' | ',') || ch.is_control())
}

/// An outgoing cookie, staged on a response until its head is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    value: String,
    secure: bool,
    expires: i64,
    domain: String,
    path: String,
    http_only: bool,
}

impl Default for Cookie {
    fn default() -> Self {
        Self {
            value: String::new(),
            secure: false,
            expires: DEFAULT_EXPIRES_SECONDS,
            domain: String::new(),
            path: DEFAULT_PATH.to_owned(),
            http_only: false,
        }
    }
}

impl Cookie {
    /// Creates a cookie with the default attributes: expires in an hour, path `/`
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into(), ..Default::default() }
    }

    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Sets the lifetime in seconds, relative to the moment the header is rendered
    #[must_use]
    pub fn expires(mut self, seconds: i64) -> Self {
        self.expires = seconds;
        self
    }

    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn expires_seconds(&self) -> i64 {
        self.expires
    }

    pub fn domain_attr(&self) -> &str {
        &self.domain
    }

    pub fn path_attr(&self) -> &str {
        &self.path
    }

    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    /// Renders the `Set-Cookie` header value for `name`, with `Expires` computed from `now`
    pub fn to_header_value(&self, name: &str, now: SystemTime) -> String {
        let mut header = format!("{name}={}", self.value);
        if !self.domain.is_empty() {
            header.push_str("; Domain=");
            header.push_str(&self.domain);
        }
        if !self.path.is_empty() {
            header.push_str("; Path=");
            header.push_str(&self.path);
        }
        header.push_str("; Expires=");
        header.push_str(&fmt_http_date(expires_at(now, self.expires)));
        if self.secure {
            header.push_str("; Secure");
        }
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        header
    }
}

/// `now + seconds`, clamped to the range an HTTP date can express
fn expires_at(now: SystemTime, seconds: i64) -> SystemTime {
    let latest = SystemTime::UNIX_EPOCH + Duration::from_secs(LATEST_HTTP_DATE_SECONDS);
    let offset = Duration::from_secs(seconds.unsigned_abs());
    let at = if seconds >= 0 {
        now.checked_add(offset).unwrap_or(latest)
    } else {
        now.checked_sub(offset).unwrap_or(SystemTime::UNIX_EPOCH)
    };
    at.clamp(SystemTime::UNIX_EPOCH, latest)
}
