use bytes::{Buf, Bytes};

/// A unit of outgoing response data handed to the response encoder.
///
/// The generic parameter `T` is the head type, while `Data` is the payload
/// buffer type (defaults to `Bytes`).
pub enum Message<T, Data: Buf = Bytes> {
    /// Contains the head of the response
    Header(T),
    /// Contains a chunk of payload data or EOF marker
    Payload(PayloadItem<Data>),
}

/// Represents an item in the response payload stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    /// A chunk of payload data
    Chunk(Data),
    /// Marks the end of the payload stream
    Eof,
}

/// How the payload following a head is framed on the wire.
///
/// - Known length: `Content-Length` framing
/// - Chunked: `Transfer-Encoding: chunked` framing
/// - Empty: no payload at all
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    /// Payload with known length in bytes
    Length(u64),
    /// Payload using chunked transfer encoding
    Chunked,
    /// Empty payload (no body)
    Empty,
}

impl PayloadSize {
    /// Picks `Empty` for zero bytes, `Length` otherwise
    #[inline]
    pub fn for_length(length: usize) -> Self {
        match length {
            0 => PayloadSize::Empty,
            n => PayloadSize::Length(n as u64),
        }
    }

    /// Returns true if the payload uses chunked transfer encoding
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, PayloadSize::Chunked)
    }

    /// Returns true if the payload is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, PayloadSize::Empty)
    }
}

impl<T> From<Bytes> for Message<T> {
    fn from(bytes: Bytes) -> Self {
        Self::Payload(PayloadItem::Chunk(bytes))
    }
}

impl<D: Buf> PayloadItem<D> {
    /// Returns true if this item represents the end of the payload stream
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    /// Returns true if this item contains chunk data
    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }
}
