//! The request/response core of a small HTTP dispatch layer.
//!
//! A transport hands over a fully buffered [`RawRequest`](protocol::RawRequest).
//! It is decoded into a [`Connection`](connection::Connection), which exposes
//! the request (path, query and body arguments, headers, cookies, uploaded
//! files) and builds the response through a small state machine. The
//! connection reports its output through a [`ReplySink`](connection::ReplySink),
//! so it never deals with sockets itself.
//!
//! # Example
//!
//! ```
//! use dispatch_http::connection::{Connection, MessageWriter};
//! use dispatch_http::protocol::RawRequest;
//! use http::Method;
//!
//! let (writer, mut receiver) = MessageWriter::channel();
//! let raw = RawRequest::new(Method::GET, "/greet?name=ann");
//! let mut conn = Connection::initialize(raw, Box::new(writer)).unwrap();
//!
//! let name = conn.get_argument("name").to_owned();
//! conn.write(format!("hello {name}")).unwrap();
//! conn.finish().unwrap();
//!
//! let wire = receiver.try_recv().unwrap();
//! assert!(wire.ends_with(b"hello ann"));
//! ```
//!
//! # Modules
//!
//! - [`protocol`]: methods, status codes, raw request, response head, errors
//! - [`codec`]: request decoding, response framing, cookies, form bodies
//! - [`connection`]: the request/response object and the transport boundary
//! - [`handler`]: error handlers used by `send_error`

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
