//! The request/response object and its boundary to the transport.
//!
//! - [`Connection`]: what a handler works with, one per request
//! - [`ParsedRequest`]: the decoded request half of a connection
//! - [`ReplySink`]: the hooks a connection uses to emit its reply
//! - [`MessageWriter`]: a `ReplySink` that encodes replies to wire bytes

#[allow(clippy::module_inception)]
mod connection;
mod error;
mod message_writer;
mod parsed_request;
mod sink;

pub use connection::Connection;
pub use error::{ConnectionError, InitError};
pub use message_writer::MessageWriter;
pub use parsed_request::ParsedRequest;
#[cfg(test)]
pub use sink::MockReplySink;
pub use sink::ReplySink;
