use crate::protocol::{PayloadItem, SendError};
use bytes::{Buf, BufMut, BytesMut};
use std::io::Write;

use tokio_util::codec::Encoder;

/// Frames each chunk as `<hex size>\r\n<data>\r\n` and the end as `0\r\n\r\n`.
///
/// Empty chunks are dropped, since a zero size chunk would terminate the body early.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkedEncoder {
    eof: bool,
    send_size: usize,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finish(&self) -> bool {
        self.eof
    }

    /// Total payload bytes written so far, framing excluded
    pub fn send_size(&self) -> usize {
        self.send_size
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            return Err(SendError::unexpected_message("chunk after end of chunked body"));
        }

        match item {
            PayloadItem::Chunk(mut bytes) => {
                let size = bytes.remaining();
                if size == 0 {
                    return Ok(());
                }
                write!(Writer(dst), "{size:X}\r\n")?;
                dst.reserve(size + 2);
                while bytes.has_remaining() {
                    let chunk = bytes.chunk();
                    let len = chunk.len();
                    dst.put_slice(chunk);
                    bytes.advance(len);
                }
                dst.put_slice(b"\r\n");
                self.send_size += size;
                Ok(())
            }
            PayloadItem::Eof => {
                self.eof = true;
                dst.put_slice(b"0\r\n\r\n");
                Ok(())
            }
        }
    }
}

struct Writer<'a>(&'a mut BytesMut);

impl std::io::Write for Writer<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
