//! The boundary between a [`Connection`](super::Connection) and the transport.
//!
//! The connection never touches a socket. It reports what it wants written
//! through four hooks, one for a complete reply and three for a chunked one.
//! A hook fails only when the transport can no longer deliver bytes.

use bytes::Bytes;

use crate::protocol::{ResponseHead, SendError};

#[cfg_attr(test, mockall::automock)]
pub trait ReplySink {
    /// Sends a complete reply: head plus the whole body
    fn send_reply(&mut self, head: ResponseHead, body: Bytes) -> Result<(), SendError>;

    /// Sends the head of a chunked reply
    fn send_reply_start(&mut self, head: ResponseHead) -> Result<(), SendError>;

    /// Sends one chunk of a chunked reply, never called with an empty chunk
    fn send_reply_chunk(&mut self, chunk: Bytes) -> Result<(), SendError>;

    /// Terminates a chunked reply
    fn send_reply_end(&mut self) -> Result<(), SendError>;
}
