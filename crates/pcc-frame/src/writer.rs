use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use pcc_transport::PccStream;

use crate::codec::{encode_u32, FrameConfig, LENGTH_PREFIX_SIZE};
use crate::error::{classify, FrameError, Result};
use crate::reader::socket_to_frame_error;

/// Write all of `buf` to `writer`, then flush.
///
/// Short writes advance an offset and retry. A write that accepts zero bytes
/// means the peer can no longer take data and yields
/// [`FrameError::ConnectionClosed`].
pub fn send_exact<W: Write + ?Sized>(writer: &mut W, buf: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < buf.len() {
        match writer.write(&buf[offset..]) {
            Ok(0) => {
                return Err(FrameError::ConnectionClosed {
                    expected: buf.len() as u64,
                    received: offset as u64,
                })
            }
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(classify(err)),
        }
    }

    loop {
        match writer.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(classify(err)),
        }
    }
}

/// Writes length prefixes and payload chunks to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(LENGTH_PREFIX_SIZE),
            config,
        }
    }

    /// Send a 4-byte network-order `u32` (the payload length or the count reply).
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.buf.clear();
        encode_u32(value, &mut self.buf);
        send_exact(&mut self.inner, &self.buf)
    }

    /// Send one payload chunk in full.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        send_exact(&mut self.inner, chunk)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameWriter<PccStream> {
    /// Create a frame writer for `PccStream` and apply write timeout from config.
    pub fn with_config_pcc(inner: PccStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(socket_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn write_u32_is_big_endian() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.write_u32(7).unwrap();
        writer.write_u32(0xDEAD_BEEF).unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(wire, [0, 0, 0, 7, 0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn write_length_and_chunks() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.write_u32(7).unwrap();
        writer.write_chunk(b"AB ").unwrap();
        writer.write_chunk(b"ab12").unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(&wire[..4], &7u32.to_be_bytes());
        assert_eq!(&wire[4..], b"AB ab12");
    }

    #[test]
    fn send_exact_tolerates_short_writes() {
        let mut sink = OneByteWriter::default();
        send_exact(&mut sink, b"partial writes").unwrap();
        assert_eq!(sink.data, b"partial writes");
        assert_eq!(sink.calls, 14);
    }

    #[test]
    fn zero_byte_write_is_connection_closed() {
        let mut sink = ZeroWriter;
        let err = send_exact(&mut sink, b"abc").unwrap_err();
        assert!(matches!(
            err,
            FrameError::ConnectionClosed {
                expected: 3,
                received: 0
            }
        ));
        assert!(err.is_transport());
    }

    #[test]
    fn broken_pipe_is_transport_error() {
        let mut writer = FrameWriter::new(FailingWriter(ErrorKind::BrokenPipe));
        let err = writer.write_u32(1).unwrap_err();
        assert!(matches!(err, FrameError::Transport(e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[test]
    fn local_write_failure_is_fatal() {
        let mut writer = FrameWriter::new(FailingWriter(ErrorKind::InvalidInput));
        let err = writer.write_chunk(b"data").unwrap_err();
        assert!(!err.is_transport());
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = FrameWriter::new(sink);

        writer.write_u32(1).unwrap();

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        let writer_impl = InterruptedWriteThenFlush {
            wrote_once: false,
            flush_interrupted: false,
            data: Vec::new(),
        };

        let mut writer = FrameWriter::new(writer_impl);
        writer.write_chunk(b"retry").unwrap();

        let inner = writer.into_inner();
        assert_eq!(inner.data, b"retry");
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        assert!(writer.config().write_timeout.is_none());
        let _ = writer.get_ref();
        let _ = writer.get_mut();
        let _inner = writer.into_inner();
    }

    #[derive(Default)]
    struct OneByteWriter {
        data: Vec<u8>,
        calls: usize,
    }

    impl Write for OneByteWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls += 1;
            match buf.first() {
                Some(byte) => {
                    self.data.push(*byte);
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FailingWriter(ErrorKind);

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(self.0))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct InterruptedWriteThenFlush {
        wrote_once: bool,
        flush_interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedWriteThenFlush {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            if !self.flush_interrupted {
                self.flush_interrupted = true;
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            Ok(())
        }
    }
}
