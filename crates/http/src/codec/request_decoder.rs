//! Decoder turning raw connection bytes into a fully buffered [`RawRequest`].
//!
//! Decoding happens in two phases. The head is parsed with `httparse`, which
//! gives the method, the request target and the header list. Then the
//! `Content-Length` body is collected in full before the request is emitted.
//! Streaming request bodies are not supported: any `Transfer-Encoding` header
//! is rejected with [`ParseError::UnsupportedTransferEncoding`].
//!
//! # Limits
//!
//! [`RequestLimits`] bounds the head size, the header count and the body
//! size. The defaults are 8 KiB, 64 headers and 8 MiB.

use bytes::{Bytes, BytesMut};
use http::Method;
use httparse::{EMPTY_HEADER, Error, Status};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, RawRequest};

/// Default maximum size in bytes of the request line plus headers
pub const DEFAULT_MAX_HEADER_BYTES: usize = 8 * 1024;

/// Default maximum number of headers in a request
pub const DEFAULT_MAX_HEADERS: usize = 64;

/// Default maximum size in bytes of a request body
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Size bounds applied while decoding a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    max_header_bytes: usize,
    max_headers: usize,
    max_body_bytes: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            max_headers: DEFAULT_MAX_HEADERS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl RequestLimits {
    #[must_use]
    pub fn max_header_bytes(mut self, bytes: usize) -> Self {
        self.max_header_bytes = bytes;
        self
    }

    #[must_use]
    pub fn max_headers(mut self, count: usize) -> Self {
        self.max_headers = count;
        self
    }

    #[must_use]
    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    pub fn header_bytes_limit(&self) -> usize {
        self.max_header_bytes
    }

    pub fn headers_limit(&self) -> usize {
        self.max_headers
    }

    pub fn body_bytes_limit(&self) -> usize {
        self.max_body_bytes
    }
}

/// A parsed head waiting for its body bytes
struct Pending {
    request: RawRequest,
    body_length: usize,
}

/// Decodes one [`RawRequest`] at a time.
///
/// The decoder keeps the parsed head in `pending` while the body is still
/// arriving, so a head is never parsed twice.
pub struct RequestDecoder {
    limits: RequestLimits,
    pending: Option<Pending>,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: RequestLimits) -> Self {
        Self { limits, pending: None }
    }

    pub fn limits(&self) -> &RequestLimits {
        &self.limits
    }

    fn decode_head(&self, src: &mut BytesMut) -> Result<Option<Pending>, ParseError> {
        let max_headers = self.limits.max_headers;
        let max_header_bytes = self.limits.max_header_bytes;

        let mut headers = vec![EMPTY_HEADER; max_headers];
        let mut req = httparse::Request::new(&mut headers);

        let status = req.parse(&src[..]).map_err(|e| match e {
            Error::TooManyHeaders => ParseError::too_many_headers(max_headers),
            e => ParseError::invalid_header(e.to_string()),
        })?;

        let body_offset = match status {
            Status::Complete(body_offset) => body_offset,
            Status::Partial => {
                ensure!(src.len() <= max_header_bytes, ParseError::too_large_header(src.len(), max_header_bytes));
                return Ok(None);
            }
        };
        trace!(header_size = body_offset, "parsed request head");
        ensure!(body_offset <= max_header_bytes, ParseError::too_large_header(body_offset, max_header_bytes));

        match req.version {
            Some(0 | 1) => {}
            v => return Err(ParseError::InvalidVersion(v)),
        }

        let method = req.method.ok_or(ParseError::InvalidMethod)?;
        let method = Method::from_bytes(method.as_bytes()).map_err(|_| ParseError::InvalidMethod)?;
        let uri = req.path.ok_or(ParseError::InvalidUri)?.to_owned();

        let base = src.as_ptr() as usize;
        let indices: Vec<HeaderIndex> = req.headers.iter().map(|header| HeaderIndex::record(base, header)).collect();

        let mut request = RawRequest::new(method, uri);
        let mut content_length: Option<usize> = None;

        let header_bytes: Bytes = src.split_to(body_offset).freeze();
        for index in indices {
            let name = String::from_utf8_lossy(&header_bytes[index.name.0..index.name.1]).into_owned();
            let value = header_bytes.slice(index.value.0..index.value.1);

            if name.eq_ignore_ascii_case("transfer-encoding") {
                return Err(ParseError::UnsupportedTransferEncoding);
            }
            if name.eq_ignore_ascii_case("content-length") {
                let length = parse_content_length(&value)?;
                ensure!(
                    content_length.is_none_or(|previous| previous == length),
                    ParseError::invalid_content_length("conflicting content-length headers")
                );
                content_length = Some(length);
            }

            request.push_header(name, value);
        }

        let body_length = content_length.unwrap_or(0);
        ensure!(
            body_length <= self.limits.max_body_bytes,
            ParseError::too_large_body(body_length, self.limits.max_body_bytes)
        );

        Ok(Some(Pending { request, body_length }))
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::with_limits(RequestLimits::default())
    }
}

impl Decoder for RequestDecoder {
    type Item = RawRequest;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.pending.is_none() {
            match self.decode_head(src)? {
                Some(pending) => self.pending = Some(pending),
                None => return Ok(None),
            }
        }

        let Some(body_length) = self.pending.as_ref().map(|pending| pending.body_length) else {
            return Ok(None);
        };

        if src.len() < body_length {
            src.reserve(body_length - src.len());
            return Ok(None);
        }

        let Some(Pending { request, .. }) = self.pending.take() else {
            return Ok(None);
        };
        let body = src.split_to(body_length).freeze();
        trace!(body_size = body_length, "decoded request body");
        Ok(Some(request.body(body)))
    }
}

/// Byte ranges of a header's name and value inside the head buffer.
#[derive(Clone, Copy)]
struct HeaderIndex {
    name: (usize, usize),
    value: (usize, usize),
}

impl HeaderIndex {
    fn record(base: usize, header: &httparse::Header<'_>) -> Self {
        let name_start = header.name.as_ptr() as usize - base;
        let value_start = header.value.as_ptr() as usize - base;
        Self {
            name: (name_start, name_start + header.name.len()),
            value: (value_start, value_start + header.value.len()),
        }
    }
}

fn parse_content_length(value: &[u8]) -> Result<usize, ParseError> {
    let text = std::str::from_utf8(value).map_err(|_| ParseError::invalid_content_length("value is not ascii"))?;
    text.trim().parse::<usize>().map_err(|_| ParseError::invalid_content_length(format!("value {text} is not a length")))
}
