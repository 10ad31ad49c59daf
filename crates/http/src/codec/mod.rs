//! Encoding and decoding of everything that crosses the wire.
//!
//! # Request side
//!
//! - [`RequestDecoder`]: buffers one complete request from connection bytes
//! - [`cookie`]: parses the `Cookie` request header
//! - [`form`]: decodes urlencoded and multipart request bodies
//!
//! # Response side
//!
//! - [`ResponseEncoder`]: writes a response head followed by its payload,
//!   framed either by `Content-Length` or by chunked transfer encoding
//! - [`cookie::Cookie`]: renders `Set-Cookie` header values
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use dispatch_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//!
//! let mut buffer = BytesMut::from("GET /index?page=2 HTTP/1.1\r\nHost: localhost\r\n\r\n");
//! let request = RequestDecoder::new().decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(request.uri(), "/index?page=2");
//! ```

mod body;
pub mod cookie;
pub mod form;
mod header;
mod request_decoder;
mod response_encoder;

pub use body::{ChunkedEncoder, LengthEncoder, PayloadEncoder};
pub use header::HeaderEncoder;
pub use request_decoder::{
    DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_HEADER_BYTES, DEFAULT_MAX_HEADERS, RequestDecoder, RequestLimits,
};
pub use response_encoder::ResponseEncoder;
