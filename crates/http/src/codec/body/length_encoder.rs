use crate::ensure;
use crate::protocol::{PayloadItem, SendError};
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::Encoder;
use tracing::warn;

/// Writes payload bytes verbatim, refusing to go past the declared `Content-Length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthEncoder {
    length: u64,
    eof: bool,
}

impl LengthEncoder {
    pub fn new(length: u64) -> Self {
        Self { length, eof: false }
    }

    pub fn is_finish(&self) -> bool {
        self.eof
    }

    /// Bytes still owed to the peer
    pub fn remaining(&self) -> u64 {
        self.length
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for LengthEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            warn!("encode payload_item but no need to encode anymore");
            return Ok(());
        }

        match item {
            PayloadItem::Chunk(mut bytes) => {
                let size = bytes.remaining() as u64;
                ensure!(
                    size <= self.length,
                    SendError::invalid_body(format!("{size} bytes exceed the remaining content-length {}", self.length))
                );
                while bytes.has_remaining() {
                    let chunk = bytes.chunk();
                    let len = chunk.len();
                    dst.put_slice(chunk);
                    bytes.advance(len);
                }
                self.length -= size;
                Ok(())
            }
            PayloadItem::Eof => {
                ensure!(
                    self.length == 0,
                    SendError::invalid_body(format!("body ended {} bytes short of content-length", self.length))
                );
                self.eof = true;
                Ok(())
            }
        }
    }
}
