use crate::codec::ResponseEncoder;
use crate::connection::ReplySink;
use crate::protocol::{Message, PayloadItem, PayloadSize, ResponseHead, SendError};
use bytes::{Buf, Bytes, BytesMut};
use http::{HeaderValue, header};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio_util::codec::Encoder;
use tracing::trace;

const CLOSE_VALUE: HeaderValue = HeaderValue::from_static("close");

/// A [`ReplySink`] that encodes replies into wire bytes and hands them to a channel.
///
/// The receiving side is typically a task copying the bytes into a socket.
/// Each reply is marked `Connection: close`, the transport serves a single
/// request per connection.
#[derive(Debug)]
pub struct MessageWriter {
    sender: UnboundedSender<Bytes>,
    buffer: BytesMut,
    encoder: ResponseEncoder,
}

impl MessageWriter {
    pub fn new(sender: UnboundedSender<Bytes>) -> Self {
        Self { sender, buffer: BytesMut::with_capacity(4 * 1024), encoder: ResponseEncoder::new() }
    }

    /// Creates a writer together with the receiver of its encoded bytes
    pub fn channel() -> (Self, UnboundedReceiver<Bytes>) {
        let (sender, receiver) = unbounded_channel();
        (Self::new(sender), receiver)
    }

    #[inline]
    fn write<D>(&mut self, item: Message<(ResponseHead, PayloadSize), D>) -> Result<(), SendError>
    where
        D: Buf,
    {
        self.encoder.encode(item, &mut self.buffer)
    }

    fn flush(&mut self) -> Result<(), SendError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let bytes = self.buffer.split().freeze();
        trace!(size = bytes.len(), "flush encoded response bytes");
        self.sender.send(bytes).map_err(|_| SendError::closed())
    }
}

fn close(mut head: ResponseHead) -> ResponseHead {
    head.headers_mut().insert(header::CONNECTION, CLOSE_VALUE);
    head
}

impl ReplySink for MessageWriter {
    fn send_reply(&mut self, head: ResponseHead, body: Bytes) -> Result<(), SendError> {
        let payload_size = PayloadSize::for_length(body.len());
        self.write(Message::<_, Bytes>::Header((close(head), payload_size)))?;
        if !body.is_empty() {
            self.write(Message::<(ResponseHead, PayloadSize)>::from(body))?;
        }
        self.write(Message::<(ResponseHead, PayloadSize), Bytes>::Payload(PayloadItem::Eof))?;
        self.flush()
    }

    fn send_reply_start(&mut self, head: ResponseHead) -> Result<(), SendError> {
        self.write(Message::<_, Bytes>::Header((close(head), PayloadSize::Chunked)))?;
        self.flush()
    }

    fn send_reply_chunk(&mut self, chunk: Bytes) -> Result<(), SendError> {
        self.write(Message::<(ResponseHead, PayloadSize)>::from(chunk))?;
        self.flush()
    }

    fn send_reply_end(&mut self) -> Result<(), SendError> {
        self.write(Message::<(ResponseHead, PayloadSize), Bytes>::Payload(PayloadItem::Eof))?;
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    fn drain(receiver: &mut UnboundedReceiver<Bytes>) -> String {
        let mut wire = Vec::new();
        while let Ok(bytes) = receiver.try_recv() {
            wire.extend_from_slice(&bytes);
        }
        String::from_utf8(wire).unwrap()
    }

    #[test]
    fn test_whole_reply() {
        let (mut writer, mut receiver) = MessageWriter::channel();
        writer.send_reply(ResponseHead::from_status(StatusCode::OK), Bytes::from_static(b"hello")).unwrap();

        let wire = drain(&mut receiver);
        assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(wire.contains("connection: close\r\n"));
        assert!(wire.contains("content-length: 5\r\n"));
        assert!(wire.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn test_chunked_reply() {
        let (mut writer, mut receiver) = MessageWriter::channel();
        writer.send_reply_start(ResponseHead::from_status(StatusCode::OK)).unwrap();
        writer.send_reply_chunk(Bytes::from_static(b"ab")).unwrap();
        writer.send_reply_chunk(Bytes::from_static(b"cde")).unwrap();
        writer.send_reply_end().unwrap();

        let wire = drain(&mut receiver);
        assert!(wire.contains("transfer-encoding: chunked\r\n"));
        assert!(wire.ends_with("\r\n\r\n2\r\nab\r\n3\r\ncde\r\n0\r\n\r\n"));
    }

    #[test]
    fn test_closed_receiver() {
        let (mut writer, receiver) = MessageWriter::channel();
        drop(receiver);
        let result = writer.send_reply(ResponseHead::from_status(StatusCode::OK), Bytes::new());
        assert!(matches!(result, Err(SendError::Io { .. })));
    }
}
