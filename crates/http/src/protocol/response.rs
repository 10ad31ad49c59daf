//! HTTP response head handling.
//!
//! The head is what the transport writes before any body bytes: the status
//! code, the reason phrase for the status line and the output headers. The
//! reason phrase is carried separately from the code because callers may
//! replace the standard phrase with their own.

use http::{HeaderMap, StatusCode};

#[derive(Debug, Clone)]
pub struct ResponseHead {
    status: StatusCode,
    reason: String,
    headers: HeaderMap,
}

impl ResponseHead {
    pub fn new(status: StatusCode, reason: impl Into<String>, headers: HeaderMap) -> Self {
        Self { status, reason: reason.into(), headers }
    }

    /// Creates a head using the canonical reason phrase of `status`
    pub fn from_status(status: StatusCode) -> Self {
        Self::new(status, status.canonical_reason().unwrap_or_default(), HeaderMap::new())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}
