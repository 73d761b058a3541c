use std::fmt;
use std::io::{Read, Write};

use pcc_frame::{FrameConfig, FrameError, FrameReader, FrameWriter};
use tracing::{debug, trace};

use crate::error::{PeerError, Result};
use crate::tally::CharTally;

/// Where a connection is in the receive-count-reply exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    AwaitingLength,
    ReceivingPayload,
    SendingResult,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Idle => "idle",
            ConnectionState::AwaitingLength => "receiving length",
            ConnectionState::ReceivingPayload => "receiving payload",
            ConnectionState::SendingResult => "sending result",
        };
        f.write_str(name)
    }
}

/// How a single connection ended, when it did not take the process down.
#[derive(Debug)]
pub enum Outcome {
    /// Full exchange done; local counts were merged into the aggregate.
    Completed { length: u32, printable: u32 },
    /// Peer or network failure; local counts were discarded.
    Aborted {
        stage: ConnectionState,
        error: FrameError,
    },
}

/// Runs the server side of the protocol and owns the aggregate tally.
///
/// The aggregate only changes inside [`ConnectionHandler::handle`], after the
/// count reply was fully sent. Nothing else can mutate it.
pub struct ConnectionHandler {
    config: FrameConfig,
    aggregate: CharTally,
    state: ConnectionState,
}

impl ConnectionHandler {
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            config,
            aggregate: CharTally::new(),
            state: ConnectionState::Idle,
        }
    }

    /// Service one accepted connection start to finish.
    ///
    /// Returns `Ok(Outcome::Aborted)` for transport failures so the caller
    /// can keep accepting. Any other I/O failure is returned as
    /// [`PeerError::Connection`] and is meant to end the process.
    pub fn handle<S: Read + Write>(&mut self, stream: &mut S) -> Result<Outcome> {
        let mut local = CharTally::new();
        let result = self.exchange(stream, &mut local);
        let stage = std::mem::replace(&mut self.state, ConnectionState::Idle);

        match result {
            Ok((length, printable)) => {
                self.aggregate.merge(&local);
                Ok(Outcome::Completed { length, printable })
            }
            Err(error) if error.is_transport() => Ok(Outcome::Aborted { stage, error }),
            Err(source) => Err(PeerError::Connection { stage, source }),
        }
    }

    fn exchange<S: Read + Write>(
        &mut self,
        stream: &mut S,
        local: &mut CharTally,
    ) -> std::result::Result<(u32, u32), FrameError> {
        self.state = ConnectionState::AwaitingLength;
        let mut reader = FrameReader::with_config(&mut *stream, self.config.clone());
        let length = reader.read_u32()?;
        debug!(length, "received payload length");

        self.state = ConnectionState::ReceivingPayload;
        let mut printable = 0u32;
        reader.read_payload(u64::from(length), |chunk| {
            printable += local.record(chunk);
            trace!(chunk = chunk.len(), printable, "counted chunk");
        })?;
        drop(reader);
        debug_assert_eq!(u64::from(printable), local.total());

        self.state = ConnectionState::SendingResult;
        let mut writer = FrameWriter::with_config(&mut *stream, self.config.clone());
        writer.write_u32(printable)?;
        debug!(printable, "sent printable count");

        Ok((length, printable))
    }

    /// Current protocol state. `Idle` outside of [`ConnectionHandler::handle`].
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Borrow the aggregate tally.
    pub fn aggregate(&self) -> &CharTally {
        &self.aggregate
    }

    /// Copy of the aggregate tally for reporting.
    pub fn snapshot(&self) -> CharTally {
        self.aggregate.clone()
    }

    /// Frame configuration applied to each connection.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Default for ConnectionHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, ErrorKind};

    use super::*;

    /// In-memory duplex stream with optional short reads and injected failures.
    struct MockStream {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
        max_read: usize,
        read_error_at: Option<(u64, ErrorKind)>,
        write_error: Option<ErrorKind>,
    }

    impl MockStream {
        fn new(input: Vec<u8>) -> Self {
            Self {
                input: Cursor::new(input),
                output: Vec::new(),
                max_read: usize::MAX,
                read_error_at: None,
                write_error: None,
            }
        }

        fn request(payload: &[u8]) -> Self {
            let mut input = (payload.len() as u32).to_be_bytes().to_vec();
            input.extend_from_slice(payload);
            Self::new(input)
        }

        fn reply(&self) -> Option<u32> {
            let bytes: [u8; 4] = self.output.as_slice().try_into().ok()?;
            Some(u32::from_be_bytes(bytes))
        }
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if let Some((offset, kind)) = self.read_error_at {
                if self.input.position() >= offset {
                    return Err(io::Error::from(kind));
                }
            }
            let limit = buf.len().min(self.max_read);
            self.input.read(&mut buf[..limit])
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if let Some(kind) = self.write_error {
                return Err(io::Error::from(kind));
            }
            self.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn counts_all_printable_payload() {
        let mut handler = ConnectionHandler::new();
        let mut stream = MockStream::request(b"AB ab12");

        let outcome = handler.handle(&mut stream).unwrap();

        assert!(matches!(
            outcome,
            Outcome::Completed {
                length: 7,
                printable: 7
            }
        ));
        assert_eq!(stream.reply(), Some(7));
        for byte in b"AB ab12" {
            assert_eq!(handler.aggregate().get(*byte), 1);
        }
        assert_eq!(handler.state(), ConnectionState::Idle);
    }

    #[test]
    fn empty_payload_replies_zero() {
        let mut handler = ConnectionHandler::new();
        let mut stream = MockStream::request(b"");

        let outcome = handler.handle(&mut stream).unwrap();

        assert!(matches!(outcome, Outcome::Completed { length: 0, printable: 0 }));
        assert_eq!(stream.reply(), Some(0));
        assert_eq!(handler.aggregate().total(), 0);
    }

    #[test]
    fn non_printable_payload_replies_zero() {
        let mut handler = ConnectionHandler::new();
        let mut stream = MockStream::request(&vec![b'\n'; 1 << 20]);

        handler.handle(&mut stream).unwrap();

        assert_eq!(stream.reply(), Some(0));
        assert_eq!(handler.aggregate().total(), 0);
    }

    #[test]
    fn mixed_payload_counts_only_printable() {
        let mut handler = ConnectionHandler::new();
        let payload = b"hi\tthere\r\n\x00\x01~\x7f";
        let mut stream = MockStream::request(payload);

        handler.handle(&mut stream).unwrap();

        assert_eq!(stream.reply(), Some(8));
        assert_eq!(handler.aggregate().get(b'~'), 1);
        assert_eq!(handler.aggregate().get(b'h'), 2);
    }

    #[test]
    fn one_byte_reads_give_same_count() {
        let payload: Vec<u8> = (0u8..=255).cycle().take(4096).collect();

        let mut bulk_handler = ConnectionHandler::new();
        let mut bulk = MockStream::request(&payload);
        bulk_handler.handle(&mut bulk).unwrap();

        let mut trickle_handler = ConnectionHandler::new();
        let mut trickle = MockStream::request(&payload);
        trickle.max_read = 1;
        trickle_handler.handle(&mut trickle).unwrap();

        assert_eq!(bulk.reply(), trickle.reply());
        assert_eq!(bulk.reply(), Some(16 * 95));
        assert_eq!(bulk_handler.aggregate(), trickle_handler.aggregate());
    }

    #[test]
    fn small_chunk_size_gives_same_count() {
        let payload = b"The quick brown fox jumps over the lazy dog".repeat(100);
        let mut handler = ConnectionHandler::with_config(FrameConfig {
            chunk_size: 7,
            ..FrameConfig::default()
        });
        let mut stream = MockStream::request(&payload);

        handler.handle(&mut stream).unwrap();

        assert_eq!(stream.reply(), Some(payload.len() as u32));
        assert_eq!(handler.config().chunk_size, 7);
    }

    #[test]
    fn close_mid_length_aborts_without_merge() {
        let mut handler = ConnectionHandler::new();
        let mut stream = MockStream::new(vec![0, 0]);

        let outcome = handler.handle(&mut stream).unwrap();

        match outcome {
            Outcome::Aborted { stage, error } => {
                assert_eq!(stage, ConnectionState::AwaitingLength);
                assert!(matches!(error, FrameError::ConnectionClosed { .. }));
            }
            other => panic!("expected abort, got {other:?}"),
        }
        assert!(stream.output.is_empty());
        assert_eq!(handler.aggregate().total(), 0);
        assert_eq!(handler.state(), ConnectionState::Idle);
    }

    #[test]
    fn close_mid_payload_discards_local_counts() {
        let mut handler = ConnectionHandler::new();
        handler.handle(&mut MockStream::request(b"abc")).unwrap();
        let before = handler.snapshot();

        let mut input = 10u32.to_be_bytes().to_vec();
        input.extend_from_slice(b"xyz");
        let mut stream = MockStream::new(input);
        let outcome = handler.handle(&mut stream).unwrap();

        assert!(matches!(
            outcome,
            Outcome::Aborted {
                stage: ConnectionState::ReceivingPayload,
                ..
            }
        ));
        assert!(stream.output.is_empty());
        assert_eq!(handler.aggregate(), &before);
        assert_eq!(handler.aggregate().get(b'x'), 0);
    }

    #[test]
    fn reset_mid_payload_aborts() {
        let mut handler = ConnectionHandler::new();
        let mut stream = MockStream::request(b"abcdef");
        stream.read_error_at = Some((6, ErrorKind::ConnectionReset));
        stream.max_read = 2;

        let outcome = handler.handle(&mut stream).unwrap();

        assert!(matches!(
            outcome,
            Outcome::Aborted {
                stage: ConnectionState::ReceivingPayload,
                error: FrameError::Transport(_),
            }
        ));
        assert_eq!(handler.aggregate().total(), 0);
    }

    #[test]
    fn broken_pipe_on_reply_aborts_without_merge() {
        let mut handler = ConnectionHandler::new();
        let mut stream = MockStream::request(b"abc");
        stream.write_error = Some(ErrorKind::BrokenPipe);

        let outcome = handler.handle(&mut stream).unwrap();

        assert!(matches!(
            outcome,
            Outcome::Aborted {
                stage: ConnectionState::SendingResult,
                ..
            }
        ));
        assert_eq!(handler.aggregate().total(), 0);
    }

    #[test]
    fn local_read_failure_is_fatal() {
        let mut handler = ConnectionHandler::new();
        let mut stream = MockStream::request(b"abc");
        stream.read_error_at = Some((4, ErrorKind::PermissionDenied));

        let err = handler.handle(&mut stream).unwrap_err();

        assert!(matches!(
            err,
            PeerError::Connection {
                stage: ConnectionState::ReceivingPayload,
                ..
            }
        ));
        assert!(!err.is_transport());
        assert_eq!(handler.aggregate().total(), 0);
        assert_eq!(handler.state(), ConnectionState::Idle);
    }

    #[test]
    fn local_write_failure_is_fatal() {
        let mut handler = ConnectionHandler::new();
        let mut stream = MockStream::request(b"abc");
        stream.write_error = Some(ErrorKind::InvalidInput);

        let err = handler.handle(&mut stream).unwrap_err();

        assert!(matches!(
            err,
            PeerError::Connection {
                stage: ConnectionState::SendingResult,
                ..
            }
        ));
    }

    #[test]
    fn aggregate_sums_sequential_connections() {
        let mut handler = ConnectionHandler::new();
        let payloads: [&[u8]; 3] = [b"aaa", b"bb b", b"~~c"];

        for payload in payloads {
            handler.handle(&mut MockStream::request(payload)).unwrap();
        }
        handler.handle(&mut MockStream::new(vec![0])).unwrap();

        let aggregate = handler.aggregate();
        assert_eq!(aggregate.get(b'a'), 3);
        assert_eq!(aggregate.get(b'b'), 3);
        assert_eq!(aggregate.get(b' '), 1);
        assert_eq!(aggregate.get(b'~'), 2);
        assert_eq!(aggregate.get(b'c'), 1);
        assert_eq!(aggregate.total(), 10);
    }

    #[test]
    fn state_names() {
        assert_eq!(ConnectionState::AwaitingLength.to_string(), "receiving length");
        assert_eq!(ConnectionState::SendingResult.to_string(), "sending result");
    }
}
