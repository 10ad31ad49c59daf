//! The request/response object handed to handlers.
//!
//! A [`Connection`] owns one decoded request and the response being built for
//! it. The response moves through three states:
//!
//! ```text
//!   open ──flush()──▶ chunked ──finish()──▶ finished
//!     └──────────────finish()──────────────────┘
//! ```
//!
//! While open, the status, headers and cookies may be changed freely. The
//! first [`flush`](Connection::flush) sends the head and switches to chunked
//! transfer, after which only body bytes can be added. Once finished, the
//! response is immutable.
//!
//! Every mutator returns a [`ConnectionError`] instead of acting when the
//! operation is not legal in the current state, and leaves the connection
//! untouched in that case.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};
use tracing::{debug, trace};

use crate::codec::cookie::{self, Cookie};
use crate::codec::form::UploadFile;
use crate::connection::{ConnectionError, InitError, ParsedRequest, ReplySink};
use crate::ensure;
use crate::handler::ErrorHandler;
use crate::protocol::{HttpMethod, RawRequest, ResponseHead, status};

const DEFAULT_STATUS: u16 = 200;

pub struct Connection {
    request: ParsedRequest,
    path_arguments: HashMap<String, String>,

    status: u16,
    reason: String,
    output_headers: HeaderMap,
    output_cookies: Vec<(String, Cookie)>,
    buffer: BytesMut,
    finished: bool,
    chunked: bool,

    sink: Box<dyn ReplySink + Send>,
    error_handler: Option<Arc<dyn ErrorHandler>>,
}

impl Connection {
    pub fn new(request: ParsedRequest, sink: Box<dyn ReplySink + Send>) -> Self {
        Self {
            request,
            path_arguments: HashMap::new(),
            status: DEFAULT_STATUS,
            reason: status::reason_phrase(DEFAULT_STATUS).unwrap_or_default().to_owned(),
            output_headers: HeaderMap::new(),
            output_cookies: Vec::new(),
            buffer: BytesMut::new(),
            finished: false,
            chunked: false,
            sink,
            error_handler: None,
        }
    }

    /// Decodes `raw` and wraps it into a connection replying through `sink`
    pub fn initialize(raw: RawRequest, sink: Box<dyn ReplySink + Send>) -> Result<Self, InitError> {
        let request = ParsedRequest::parse(raw)?;
        Ok(Self::new(request, sink))
    }

    // request side

    pub fn request(&self) -> &ParsedRequest {
        &self.request
    }

    pub fn method(&self) -> HttpMethod {
        self.request.method()
    }

    pub fn path(&self) -> &str {
        self.request.path()
    }

    pub fn uri(&self) -> &str {
        self.request.uri()
    }

    pub fn query(&self) -> &str {
        self.request.query()
    }

    /// The last query value for `key`, or the empty string
    pub fn get_query_argument(&self, key: &str) -> &str {
        self.request.query_arguments().last(key).unwrap_or_default()
    }

    pub fn get_query_arguments(&self, key: &str) -> Vec<&str> {
        self.request.query_arguments().all(key).collect()
    }

    /// The last body value for `key`, or the empty string
    pub fn get_body_argument(&self, key: &str) -> &str {
        self.request.body_arguments().last(key).unwrap_or_default()
    }

    pub fn get_body_arguments(&self, key: &str) -> Vec<&str> {
        self.request.body_arguments().all(key).collect()
    }

    /// The query value for `key` if present and non-empty, else the body value, else the empty string
    pub fn get_argument(&self, key: &str) -> &str {
        match self.request.query_arguments().last(key) {
            Some(value) if !value.is_empty() => value,
            _ => self.get_body_argument(key),
        }
    }

    /// All query values for `key` followed by all body values
    pub fn get_arguments(&self, key: &str) -> Vec<&str> {
        let query = self.request.query_arguments().all(key);
        let body = self.request.body_arguments().all(key);
        query.chain(body).collect()
    }

    pub fn get_path_argument(&self, key: &str) -> &str {
        self.path_arguments.get(key).map(String::as_str).unwrap_or_default()
    }

    pub fn path_arguments(&self) -> &HashMap<String, String> {
        &self.path_arguments
    }

    /// Binds a value captured from the path by the router
    pub fn bind_path_argument(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.path_arguments.insert(name.into(), value.into());
    }

    /// The request header `name`, case-insensitive, or the empty string
    pub fn get_header(&self, name: &str) -> &str {
        self.request.headers().get(name).and_then(|value| value.to_str().ok()).unwrap_or_default()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    pub fn get_cookie(&self, name: &str) -> &str {
        self.request.cookies().get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn cookies(&self) -> &HashMap<String, String> {
        self.request.cookies()
    }

    /// The file uploaded under the form field `name`
    pub fn get_file(&self, name: &str) -> Option<UploadFile<'_>> {
        self.request.files().get(name).and_then(|file| file.view(self.request.body()))
    }

    pub fn files(&self) -> impl Iterator<Item = (&str, UploadFile<'_>)> {
        let body = self.request.body();
        self.request.files().iter().filter_map(move |(name, file)| Some((name.as_str(), file.view(body)?)))
    }

    pub fn body(&self) -> &[u8] {
        self.request.body()
    }

    pub fn body_size(&self) -> usize {
        self.request.body().len()
    }

    // response side

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_reason(&self) -> &str {
        &self.reason
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_chunked(&self) -> bool {
        self.chunked
    }

    /// Bytes written but not sent yet
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    fn ensure_open(&self) -> Result<(), ConnectionError> {
        ensure!(!self.finished, ConnectionError::Finished);
        ensure!(!self.chunked, ConnectionError::HeadersSent);
        Ok(())
    }

    /// Appends to the response body
    pub fn write(&mut self, data: impl AsRef<[u8]>) -> Result<(), ConnectionError> {
        ensure!(!self.finished, ConnectionError::Finished);
        self.buffer.extend_from_slice(data.as_ref());
        Ok(())
    }

    /// Sets the status with its standard reason phrase
    pub fn set_status(&mut self, code: u16) -> Result<(), ConnectionError> {
        self.set_status_with_reason(code, "")
    }

    /// Sets the status with a custom reason phrase, or the standard one if `reason` is empty
    pub fn set_status_with_reason(&mut self, code: u16, reason: &str) -> Result<(), ConnectionError> {
        ensure!(status::is_supported(code), ConnectionError::UnsupportedStatus(code));
        self.ensure_open()?;

        let reason = if reason.is_empty() {
            status::reason_phrase(code).ok_or(ConnectionError::UnsupportedStatus(code))?
        } else {
            ensure!(HeaderValue::from_str(reason).is_ok(), ConnectionError::InvalidReason);
            reason
        };

        self.status = code;
        reason.clone_into(&mut self.reason);
        Ok(())
    }

    /// Adds an output header, keeping earlier values of the same name
    pub fn add_header(&mut self, name: &str, value: &str) -> Result<(), ConnectionError> {
        self.ensure_open()?;
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(ConnectionError::invalid_header)?;
        let value = HeaderValue::from_str(value).map_err(ConnectionError::invalid_header)?;
        self.output_headers.append(name, value);
        Ok(())
    }

    /// Removes every output header called `name`, returning whether any existed
    pub fn remove_header(&mut self, name: &str) -> Result<bool, ConnectionError> {
        self.ensure_open()?;
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(ConnectionError::invalid_header)?;
        Ok(self.output_headers.remove(name).is_some())
    }

    /// Drops all output headers, does nothing once the head is sent
    pub fn clear_headers(&mut self) {
        if self.finished || self.chunked {
            return;
        }
        self.output_headers.clear();
    }

    pub fn output_headers(&self) -> &HeaderMap {
        &self.output_headers
    }

    /// Stages a cookie, sent as `Set-Cookie` with the response head.
    ///
    /// A cookie with the same name, domain and path as a staged one is rejected.
    pub fn set_cookie(&mut self, name: &str, cookie: Cookie) -> Result<(), ConnectionError> {
        self.ensure_open()?;
        ensure!(cookie::is_valid_name(name), ConnectionError::invalid_cookie(name));
        ensure!(
            HeaderValue::from_str(&cookie.to_header_value(name, SystemTime::now())).is_ok(),
            ConnectionError::invalid_cookie(name)
        );

        let duplicate = self.output_cookies.iter().any(|(staged_name, staged)| {
            staged_name == name && staged.domain_attr() == cookie.domain_attr() && staged.path_attr() == cookie.path_attr()
        });
        ensure!(
            !duplicate,
            ConnectionError::DuplicateCookie {
                name: name.to_owned(),
                domain: cookie.domain_attr().to_owned(),
                path: cookie.path_attr().to_owned(),
            }
        );

        self.output_cookies.push((name.to_owned(), cookie));
        Ok(())
    }

    /// Unstages cookies called `name`, returning how many were removed.
    ///
    /// An empty `domain` or `path` matches any value of that attribute.
    pub fn remove_cookie(&mut self, name: &str, domain: &str, path: &str) -> Result<usize, ConnectionError> {
        self.ensure_open()?;
        let before = self.output_cookies.len();
        self.output_cookies.retain(|(staged_name, staged)| {
            let matches = staged_name == name
                && (domain.is_empty() || staged.domain_attr() == domain)
                && (path.is_empty() || staged.path_attr() == path);
            !matches
        });
        Ok(before - self.output_cookies.len())
    }

    pub fn output_cookies(&self) -> impl Iterator<Item = (&str, &Cookie)> {
        self.output_cookies.iter().map(|(name, cookie)| (name.as_str(), cookie))
    }

    pub fn set_error_handler(&mut self, error_handler: Arc<dyn ErrorHandler>) {
        self.error_handler = Some(error_handler);
    }

    /// Builds the response head, with every staged cookie as a `Set-Cookie` header
    fn build_head(&self) -> Result<ResponseHead, ConnectionError> {
        let status = StatusCode::from_u16(self.status).map_err(|_| ConnectionError::UnsupportedStatus(self.status))?;
        let mut headers = self.output_headers.clone();

        let now = SystemTime::now();
        for (name, cookie) in &self.output_cookies {
            let value = HeaderValue::try_from(cookie.to_header_value(name, now))
                .map_err(|_| ConnectionError::invalid_cookie(name))?;
            headers.append(header::SET_COOKIE, value);
        }

        Ok(ResponseHead::new(status, self.reason.clone(), headers))
    }

    /// Sends the buffered body as one chunk, sending the head first on the first call
    pub fn flush(&mut self) -> Result<(), ConnectionError> {
        ensure!(!self.finished, ConnectionError::Finished);

        if !self.chunked {
            let head = self.build_head()?;
            trace!(status = self.status, "start chunked response");
            self.sink.send_reply_start(head)?;
            self.chunked = true;
        }

        self.send_buffered_chunk()
    }

    /// Sends the buffer as one chunk. It is only drained once the sink accepted it
    fn send_buffered_chunk(&mut self) -> Result<(), ConnectionError> {
        if !self.buffer.is_empty() {
            self.sink.send_reply_chunk(self.buffer.clone().freeze())?;
            self.buffer.clear();
        }
        Ok(())
    }

    /// Completes the response, a no-op when it is already finished
    pub fn finish(&mut self) -> Result<(), ConnectionError> {
        if self.finished {
            return Ok(());
        }

        if self.chunked {
            self.send_buffered_chunk()?;
            self.sink.send_reply_end()?;
        } else {
            let head = self.build_head()?;
            let body: Bytes = self.buffer.clone().freeze();
            debug!(status = self.status, body_size = body.len(), path = %self.path(), "send response");
            self.sink.send_reply(head, body)?;
            self.buffer.clear();
        }

        self.finished = true;
        Ok(())
    }

    /// Redirects with `302 Found`
    pub fn redirect(&mut self, url: &str) -> Result<(), ConnectionError> {
        self.redirect_with_status(url, 302)
    }

    /// Replaces all output headers with a `Location` header and finishes with `code`
    pub fn redirect_with_status(&mut self, url: &str, code: u16) -> Result<(), ConnectionError> {
        self.ensure_open()?;
        ensure!(status::is_supported(code), ConnectionError::UnsupportedStatus(code));
        ensure!(HeaderValue::from_str(url).is_ok(), ConnectionError::invalid_header("invalid location"));

        self.clear_headers();
        self.set_status(code)?;
        self.add_header(header::LOCATION.as_str(), url)?;
        self.finish()
    }

    /// Hands the response over to the installed error handler
    pub fn send_error(&mut self, code: u16) -> Result<(), ConnectionError> {
        self.ensure_open()?;
        let error_handler = self.error_handler.clone().ok_or(ConnectionError::MissingErrorHandler)?;
        error_handler.handle_error(code, self);
        Ok(())
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("request", &self.request)
            .field("status", &self.status)
            .field("reason", &self.reason)
            .field("finished", &self.finished)
            .field("chunked", &self.chunked)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::MockReplySink;
    use crate::handler::DefaultErrorHandler;
    use http::Method;
    use mockall::Sequence;
    use mockall::predicate::eq;

    fn connection(raw: RawRequest, sink: MockReplySink) -> Connection {
        Connection::initialize(raw, Box::new(sink)).unwrap()
    }

    fn get(uri: &str) -> RawRequest {
        RawRequest::new(Method::GET, uri)
    }

    #[test]
    fn test_argument_precedence() {
        let raw = RawRequest::new(Method::POST, "/search?q=&tag=a&tag=b&page=2")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("q=rust&tag=c&page=9");
        let conn = connection(raw, MockReplySink::new());

        assert_eq!(conn.get_argument("q"), "rust");
        assert_eq!(conn.get_argument("page"), "2");
        assert_eq!(conn.get_argument("missing"), "");
        assert_eq!(conn.get_arguments("tag"), vec!["a", "b", "c"]);
        assert_eq!(conn.get_query_argument("tag"), "b");
        assert_eq!(conn.get_body_arguments("tag"), vec!["c"]);
        assert_eq!(conn.get_path_argument("id"), "");
    }

    #[test]
    fn test_defaults() {
        let conn = connection(get("/").header("User-Agent", "curl"), MockReplySink::new());
        assert_eq!(conn.status(), 200);
        assert_eq!(conn.status_reason(), "OK");
        assert_eq!(conn.get_header("user-agent"), "curl");
        assert_eq!(conn.get_header("accept"), "");
        assert!(!conn.is_finished());
        assert!(!conn.is_chunked());
    }

    #[test]
    fn test_finish_sends_whole_reply() {
        let mut sink = MockReplySink::new();
        sink.expect_send_reply()
            .withf(|head, body| {
                head.status() == StatusCode::CREATED
                    && head.headers().get("x-id").is_some_and(|v| v == "7")
                    && body.as_ref() == b"done"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut conn = connection(get("/"), sink);
        conn.set_status(201).unwrap();
        conn.add_header("X-Id", "7").unwrap();
        conn.write("done").unwrap();
        conn.finish().unwrap();
        assert!(conn.is_finished());

        // idempotent
        conn.finish().unwrap();
    }

    #[test]
    fn test_two_flushes_then_finish() {
        let mut seq = Sequence::new();
        let mut sink = MockReplySink::new();
        sink.expect_send_reply_start()
            .withf(|head| head.headers().get(header::SET_COOKIE).is_some())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        sink.expect_send_reply_chunk()
            .with(eq(Bytes::from_static(b"first")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        sink.expect_send_reply_chunk()
            .with(eq(Bytes::from_static(b"second")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        sink.expect_send_reply_end().times(1).in_sequence(&mut seq).returning(|| Ok(()));

        let mut conn = connection(get("/"), sink);
        conn.set_cookie("session", Cookie::new("abc")).unwrap();
        conn.write("first").unwrap();
        conn.flush().unwrap();
        assert!(conn.is_chunked());
        conn.write("second").unwrap();
        conn.flush().unwrap();
        // nothing buffered, no empty chunk goes out
        conn.finish().unwrap();
        assert!(conn.is_finished());
    }

    #[test]
    fn test_no_head_changes_after_flush() {
        let mut sink = MockReplySink::new();
        sink.expect_send_reply_start().times(1).returning(|_| Ok(()));

        let mut conn = connection(get("/"), sink);
        conn.flush().unwrap();

        assert!(matches!(conn.set_status(404), Err(ConnectionError::HeadersSent)));
        assert!(matches!(conn.add_header("X-A", "1"), Err(ConnectionError::HeadersSent)));
        assert!(matches!(conn.remove_header("X-A"), Err(ConnectionError::HeadersSent)));
        assert!(matches!(conn.set_cookie("a", Cookie::new("1")), Err(ConnectionError::HeadersSent)));
        assert!(matches!(conn.redirect("/elsewhere"), Err(ConnectionError::HeadersSent)));
        assert!(conn.write("still fine").is_ok());
        assert_eq!(conn.status(), 200);
    }

    #[test]
    fn test_nothing_after_finish() {
        let mut sink = MockReplySink::new();
        sink.expect_send_reply().times(1).returning(|_, _| Ok(()));

        let mut conn = connection(get("/"), sink);
        conn.finish().unwrap();

        assert!(matches!(conn.write("late"), Err(ConnectionError::Finished)));
        assert!(matches!(conn.add_header("X-A", "1"), Err(ConnectionError::Finished)));
        assert!(matches!(conn.flush(), Err(ConnectionError::Finished)));
        assert!(matches!(conn.send_error(500), Err(ConnectionError::Finished)));
        conn.clear_headers();
    }

    #[test]
    fn test_status_validation() {
        let mut conn = connection(get("/"), MockReplySink::new());

        assert!(matches!(conn.set_status(299), Err(ConnectionError::UnsupportedStatus(299))));
        assert_eq!(conn.status(), 200);

        conn.set_status_with_reason(404, "Nothing Here").unwrap();
        assert_eq!(conn.status(), 404);
        assert_eq!(conn.status_reason(), "Nothing Here");

        assert!(matches!(conn.set_status_with_reason(400, "bad\r\nreason"), Err(ConnectionError::InvalidReason)));
        assert_eq!(conn.status_reason(), "Nothing Here");

        conn.set_status(503).unwrap();
        assert_eq!(conn.status_reason(), "Service Unavailable");
    }

    #[test]
    fn test_headers() {
        let mut conn = connection(get("/"), MockReplySink::new());
        conn.add_header("X-Tag", "a").unwrap();
        conn.add_header("X-Tag", "b").unwrap();
        assert_eq!(conn.output_headers().get_all("x-tag").iter().count(), 2);

        assert!(matches!(conn.add_header("bad name", "x"), Err(ConnectionError::InvalidHeader { .. })));
        assert!(conn.remove_header("x-tag").unwrap());
        assert!(!conn.remove_header("x-tag").unwrap());

        conn.add_header("X-Other", "1").unwrap();
        conn.clear_headers();
        assert!(conn.output_headers().is_empty());
    }

    #[test]
    fn test_cookie_staging() {
        let mut conn = connection(get("/"), MockReplySink::new());

        conn.set_cookie("id", Cookie::new("1")).unwrap();
        conn.set_cookie("id", Cookie::new("2").domain("example.com")).unwrap();
        conn.set_cookie("id", Cookie::new("3").path("/app")).unwrap();
        assert!(matches!(conn.set_cookie("id", Cookie::new("4")), Err(ConnectionError::DuplicateCookie { .. })));
        assert!(matches!(conn.set_cookie("a=b", Cookie::new("4")), Err(ConnectionError::InvalidCookie { .. })));
        assert!(matches!(conn.set_cookie("x", Cookie::new("line\nbreak")), Err(ConnectionError::InvalidCookie { .. })));
        assert_eq!(conn.output_cookies().count(), 3);

        assert_eq!(conn.remove_cookie("id", "example.com", "").unwrap(), 1);
        assert_eq!(conn.remove_cookie("id", "", "").unwrap(), 2);
        assert_eq!(conn.remove_cookie("id", "", "").unwrap(), 0);
    }

    #[test]
    fn test_redirect() {
        let mut sink = MockReplySink::new();
        sink.expect_send_reply()
            .withf(|head, body| {
                head.status() == StatusCode::MOVED_PERMANENTLY
                    && head.headers().get(header::LOCATION).is_some_and(|v| v == "/new")
                    && head.headers().get("x-old").is_none()
                    && body.is_empty()
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut conn = connection(get("/old"), sink);
        conn.add_header("X-Old", "1").unwrap();
        assert!(matches!(conn.redirect_with_status("/new", 299), Err(ConnectionError::UnsupportedStatus(299))));
        assert_eq!(conn.output_headers().len(), 1);

        conn.redirect_with_status("/new", 301).unwrap();
        assert!(conn.is_finished());
    }

    #[test]
    fn test_send_error() {
        let mut conn = connection(get("/missing"), MockReplySink::new());
        assert!(matches!(conn.send_error(404), Err(ConnectionError::MissingErrorHandler)));

        let mut sink = MockReplySink::new();
        sink.expect_send_reply()
            .withf(|head, body| head.status() == StatusCode::NOT_FOUND && body.as_ref() == b"Not Found")
            .times(1)
            .returning(|_, _| Ok(()));

        let mut conn = connection(get("/missing"), sink);
        conn.set_error_handler(Arc::new(DefaultErrorHandler));
        conn.send_error(404).unwrap();
        assert!(conn.is_finished());
    }

    #[test]
    fn test_closure_error_handler() {
        let mut sink = MockReplySink::new();
        sink.expect_send_reply()
            .withf(|head, body| head.status() == StatusCode::SERVICE_UNAVAILABLE && body.as_ref() == b"custom 503")
            .times(1)
            .returning(|_, _| Ok(()));

        let mut conn = connection(get("/"), sink);
        conn.set_error_handler(Arc::new(|code: u16, conn: &mut Connection| {
            conn.set_status(code).unwrap();
            conn.write(format!("custom {code}")).unwrap();
            conn.finish().unwrap();
        }));
        conn.send_error(503).unwrap();
    }

    #[test]
    fn test_transport_failure() {
        let mut sink = MockReplySink::new();
        sink.expect_send_reply().times(1).returning(|_, _| Err(crate::protocol::SendError::closed()));

        let mut conn = connection(get("/"), sink);
        assert!(matches!(conn.finish(), Err(ConnectionError::Send { .. })));
        assert!(!conn.is_finished());
    }

    #[test]
    fn test_failed_finish_keeps_body() {
        let mut seq = Sequence::new();
        let mut sink = MockReplySink::new();
        sink.expect_send_reply()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(crate::protocol::SendError::closed()));
        sink.expect_send_reply()
            .withf(|_, body| body.as_ref() == b"payload")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let mut conn = connection(get("/"), sink);
        conn.write("payload").unwrap();
        assert!(conn.finish().is_err());
        assert_eq!(conn.buffered(), b"payload");

        conn.finish().unwrap();
        assert!(conn.is_finished());
        assert!(conn.buffered().is_empty());
    }

    #[test]
    fn test_failed_flush_keeps_chunk() {
        let mut seq = Sequence::new();
        let mut sink = MockReplySink::new();
        sink.expect_send_reply_start().times(1).in_sequence(&mut seq).returning(|_| Ok(()));
        sink.expect_send_reply_chunk()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(crate::protocol::SendError::closed()));
        sink.expect_send_reply_chunk()
            .with(eq(Bytes::from_static(b"part")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        sink.expect_send_reply_end().times(1).in_sequence(&mut seq).returning(|| Ok(()));

        let mut conn = connection(get("/"), sink);
        conn.write("part").unwrap();
        assert!(conn.flush().is_err());
        assert!(conn.is_chunked());
        assert_eq!(conn.buffered(), b"part");

        conn.finish().unwrap();
        assert!(conn.is_finished());
    }

    #[test]
    fn test_far_future_cookie_renders() {
        let mut sink = MockReplySink::new();
        sink.expect_send_reply()
            .withf(|head, _| {
                head.headers()
                    .get(header::SET_COOKIE)
                    .is_some_and(|v| v.to_str().unwrap().ends_with("Expires=Fri, 31 Dec 9999 23:59:59 GMT"))
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut conn = connection(get("/"), sink);
        conn.set_cookie("id", Cookie::new("v").expires(i64::MAX)).unwrap();
        conn.set_cookie("gone", Cookie::new("").path("/old").expires(i64::MIN)).unwrap();
        conn.finish().unwrap();
    }

    #[test]
    fn test_uploaded_file() {
        let body = "--B\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nhi\r\n\
                    --B\r\nContent-Disposition: form-data; name=\"upload\"; filename=\"a.txt\"\r\n\r\nhello\r\n--B--\r\n";
        let raw = RawRequest::new(Method::POST, "/upload")
            .header("Content-Type", "multipart/form-data; boundary=B")
            .body(body);
        let conn = connection(raw, MockReplySink::new());

        assert_eq!(conn.get_body_argument("title"), "hi");
        let file = conn.get_file("upload").unwrap();
        assert_eq!(file.filename, "a.txt");
        assert_eq!(file.data, b"hello");
        assert_eq!(conn.files().count(), 1);
        assert!(conn.get_file("title").is_none());
    }
}
