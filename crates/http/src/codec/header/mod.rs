//! Serialization of the response status line and headers.

mod header_encoder;

pub use header_encoder::HeaderEncoder;
