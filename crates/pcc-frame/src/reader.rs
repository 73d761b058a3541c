use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use pcc_transport::PccStream;
use tracing::trace;

use crate::codec::{decode_u32, FrameConfig, LENGTH_PREFIX_SIZE};
use crate::error::{classify, FrameError, Result};

/// Fill `buf` completely from `reader`.
///
/// Short reads are retried until the buffer is full. A zero-byte read before
/// that point means the peer closed early and yields
/// [`FrameError::ConnectionClosed`].
pub fn recv_exact<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(FrameError::ConnectionClosed {
                    expected: buf.len() as u64,
                    received: filled as u64,
                })
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(classify(err)),
        }
    }
    Ok(())
}

/// Reads length prefixes and payload bytes from any `Read` stream.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::new(),
            config,
        }
    }

    /// Read a 4-byte network-order `u32` (the payload length or the count reply).
    pub fn read_u32(&mut self) -> Result<u32> {
        let mut header = [0u8; LENGTH_PREFIX_SIZE];
        recv_exact(&mut self.inner, &mut header)?;
        Ok(decode_u32(&header))
    }

    /// Consume exactly `len` payload bytes, handing each chunk to `sink`.
    ///
    /// At most `chunk_size` bytes are buffered at a time. Each chunk is
    /// whatever one `read` returned, so `sink` sees the same bytes in the
    /// same order regardless of how the peer split its writes.
    pub fn read_payload<F>(&mut self, len: u64, mut sink: F) -> Result<()>
    where
        F: FnMut(&[u8]),
    {
        let capacity = self.config.chunk_size.max(1) as u64;
        let window = len.min(capacity) as usize;
        if self.buf.len() < window {
            self.buf.resize(window, 0);
        }

        let mut consumed = 0u64;
        while consumed < len {
            let want = (len - consumed).min(capacity) as usize;
            let read = match self.inner.read(&mut self.buf[..want]) {
                Ok(0) => {
                    return Err(FrameError::ConnectionClosed {
                        expected: len,
                        received: consumed,
                    })
                }
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(classify(err)),
            };

            sink(&self.buf[..read]);
            consumed += read as u64;
            trace!(read, consumed, len, "payload chunk");
        }

        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameReader<PccStream> {
    /// Create a frame reader for `PccStream` and apply read timeout from config.
    pub fn with_config_pcc(inner: PccStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(socket_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn socket_to_frame_error(err: pcc_transport::SocketError) -> FrameError {
    match err {
        pcc_transport::SocketError::Io(io) | pcc_transport::SocketError::Accept(io) => {
            FrameError::Io(io)
        }
        pcc_transport::SocketError::Bind { source, .. }
        | pcc_transport::SocketError::Connect { source, .. } => FrameError::Io(source),
    }
}
