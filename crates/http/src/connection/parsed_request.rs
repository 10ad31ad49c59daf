//! The request half of a connection, decoded once at initialization.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Uri, header};
use tracing::warn;

use crate::codec::cookie::parse_cookie_header;
use crate::codec::form::{self, FilePart};
use crate::connection::InitError;
use crate::protocol::{Arguments, HttpMethod, RawRequest};

/// Everything a handler can read about a request.
///
/// Built in one step from a [`RawRequest`]. Either every part decodes or the
/// whole request is rejected with an [`InitError`].
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    method: HttpMethod,
    uri: String,
    path: String,
    query: String,
    query_arguments: Arguments,
    body_arguments: Arguments,
    headers: HeaderMap,
    cookies: HashMap<String, String>,
    files: HashMap<String, FilePart>,
    body: Bytes,
}

impl ParsedRequest {
    pub fn parse(raw: RawRequest) -> Result<Self, InitError> {
        let (method, uri, raw_headers, body) = raw.into_parts();

        let parsed_uri = uri.parse::<Uri>().map_err(|_| InitError::InvalidUri { uri: uri.clone() })?;
        let raw_path = parsed_uri.path();
        let path = urlencoding::decode(raw_path)
            .map_err(|_| InitError::InvalidPath { path: raw_path.to_owned() })?
            .into_owned();
        let query = parsed_uri.query().unwrap_or_default().to_owned();
        let query_arguments = form::urlencoded::decode(query.as_bytes());

        let mut headers = HeaderMap::with_capacity(raw_headers.len());
        for (name, value) in raw_headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|_| InitError::InvalidHeader { name: name.clone() })?;
            let header_value = HeaderValue::from_maybe_shared(value).map_err(|_| InitError::InvalidHeader { name })?;
            headers.insert(header_name, header_value);
        }

        let cookies = match headers.get(header::COOKIE).map(HeaderValue::to_str) {
            None => HashMap::new(),
            Some(Ok(value)) => parse_cookie_header(value).unwrap_or_else(|e| {
                warn!(cause = %e, "malformed cookie header ignored");
                HashMap::new()
            }),
            Some(Err(_)) => {
                warn!("non-visible-ascii cookie header ignored");
                HashMap::new()
            }
        };

        let decoded = if body.is_empty() {
            form::DecodedBody::default()
        } else {
            let content_type = headers.get(header::CONTENT_TYPE).and_then(|value| value.to_str().ok());
            form::decode_body(content_type, &body)
        };

        Ok(Self {
            method: HttpMethod::from(&method),
            uri,
            path,
            query,
            query_arguments,
            body_arguments: decoded.fields,
            headers,
            cookies,
            files: decoded.files,
            body,
        })
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The request target exactly as it appeared on the request line
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The percent-decoded path component
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw query string, without the leading `?`
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn query_arguments(&self) -> &Arguments {
        &self.query_arguments
    }

    pub fn body_arguments(&self) -> &Arguments {
        &self.body_arguments
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn cookies(&self) -> &HashMap<String, String> {
        &self.cookies
    }

    pub fn files(&self) -> &HashMap<String, FilePart> {
        &self.files
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_parse_get() {
        let raw = RawRequest::new(Method::GET, "/users/J%C3%BCrgen/profile?tab=posts&tab=likes&page=2")
            .header("Host", "localhost")
            .header("Cookie", "session=abc; theme=dark");

        let request = ParsedRequest::parse(raw).unwrap();

        assert_eq!(request.method(), HttpMethod::Get);
        assert_eq!(request.path(), "/users/Jürgen/profile");
        assert_eq!(request.query(), "tab=posts&tab=likes&page=2");
        assert_eq!(request.query_arguments().last("tab"), Some("likes"));
        assert_eq!(request.cookies().get("theme").map(String::as_str), Some("dark"));
        assert_eq!(request.headers().get("host").unwrap(), "localhost");
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_parse_form_body() {
        let raw = RawRequest::new(Method::POST, "/login")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("user=ann&remember=1");

        let request = ParsedRequest::parse(raw).unwrap();
        assert_eq!(request.method(), HttpMethod::Post);
        assert_eq!(request.body_arguments().last("user"), Some("ann"));
        assert_eq!(request.query_arguments().len(), 0);
    }

    #[test]
    fn test_unmapped_method() {
        let raw = RawRequest::new(Method::TRACE, "/");
        assert_eq!(ParsedRequest::parse(raw).unwrap().method(), HttpMethod::Other);
    }

    #[test]
    fn test_malformed_cookie_is_dropped() {
        let raw = RawRequest::new(Method::GET, "/").header("Cookie", "a=1;b=2");
        let request = ParsedRequest::parse(raw).unwrap();
        assert!(request.cookies().is_empty());
    }

    #[test]
    fn test_rejects_bad_input() {
        let raw = RawRequest::new(Method::GET, "/a b");
        assert!(matches!(ParsedRequest::parse(raw), Err(InitError::InvalidUri { .. })));

        let raw = RawRequest::new(Method::GET, "/%FF%FE");
        assert!(matches!(ParsedRequest::parse(raw), Err(InitError::InvalidPath { .. })));

        let raw = RawRequest::new(Method::GET, "/").header("Bad Name", "x");
        assert!(matches!(ParsedRequest::parse(raw), Err(InitError::InvalidHeader { .. })));
    }

    #[test]
    fn test_last_duplicate_header_wins() {
        let raw = RawRequest::new(Method::GET, "/").header("X-Tag", "one").header("x-tag", "two");
        let request = ParsedRequest::parse(raw).unwrap();
        assert_eq!(request.headers().get("x-tag").unwrap(), "two");
    }
}
