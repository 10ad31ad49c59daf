//! The raw request handed over by the transport.
//!
//! A [`RawRequest`] is the fully buffered form of one incoming request: the
//! method token, the request target exactly as it appeared on the request line,
//! the header list in arrival order (duplicates included) and the complete body.
//! Nothing in it is validated yet; that happens when a
//! [`ParsedRequest`](crate::connection::ParsedRequest) is built from it.

use bytes::Bytes;
use http::Method;

#[derive(Debug, Clone)]
pub struct RawRequest {
    method: Method,
    uri: String,
    headers: Vec<(String, Bytes)>,
    body: Bytes,
}

impl RawRequest {
    /// Creates a request without headers and body
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self { method, uri: uri.into(), headers: Vec::new(), body: Bytes::new() }
    }

    /// Appends a header, keeping any previous header of the same name
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<Bytes>) -> Self {
        self.push_header(name, value);
        self
    }

    /// Replaces the body
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn push_header(&mut self, name: impl Into<String>, value: impl Into<Bytes>) {
        self.headers.push((name.into(), value.into()));
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn headers(&self) -> &[(String, Bytes)] {
        &self.headers
    }

    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }

    /// Splits the request into method, uri, headers and body
    pub fn into_parts(self) -> (Method, String, Vec<(String, Bytes)>, Bytes) {
        (self.method, self.uri, self.headers, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_duplicate_headers() {
        let request = RawRequest::new(Method::POST, "/upload?x=1")
            .header("Accept", "text/html")
            .header("Accept", "*/*")
            .body("a=1");

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.uri(), "/upload?x=1");
        assert_eq!(request.headers().len(), 2);
        assert_eq!(request.headers()[1].1, Bytes::from_static(b"*/*"));
        assert_eq!(&request.body_bytes()[..], b"a=1");
    }
}
