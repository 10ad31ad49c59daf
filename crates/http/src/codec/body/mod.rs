//! Payload framing for outgoing response bodies.
//!
//! - [`ChunkedEncoder`]: `Transfer-Encoding: chunked` framing, used for streamed replies
//! - [`LengthEncoder`]: raw bytes bounded by a `Content-Length`
//! - [`PayloadEncoder`]: picks one of the above from the [`PayloadSize`](crate::protocol::PayloadSize) of the head

mod chunked_encoder;
mod length_encoder;
mod payload_encoder;

pub use chunked_encoder::ChunkedEncoder;
pub use length_encoder::LengthEncoder;
pub use payload_encoder::PayloadEncoder;
