use std::io::{self, ErrorKind};

/// Errors that can occur while moving framed bytes over a stream.
///
/// `ConnectionClosed` and `Transport` are caused by the remote peer or the
/// network path and only doom the current connection. `Io` is everything
/// else, and callers treat it as fatal.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The peer closed the stream before the expected byte count arrived.
    #[error("connection closed after {received} of {expected} bytes")]
    ConnectionClosed { expected: u64, received: u64 },

    /// The peer reset the connection, the pipe broke, or an operation timed out.
    #[error("transport error: {0}")]
    Transport(io::Error),

    /// A local I/O failure not attributable to the peer.
    #[error("frame I/O error: {0}")]
    Io(io::Error),
}

impl FrameError {
    /// Whether the error is scoped to a single connection.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FrameError::ConnectionClosed { .. } | FrameError::Transport(_)
        )
    }
}

impl From<io::Error> for FrameError {
    fn from(err: io::Error) -> Self {
        classify(err)
    }
}

/// Sort a raw socket error into transport vs. fatal.
///
/// `WouldBlock` only shows up on a blocking socket when a configured read or
/// write timeout expires, so it counts as a timeout.
pub fn classify(err: io::Error) -> FrameError {
    match err.kind() {
        ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::BrokenPipe
        | ErrorKind::TimedOut
        | ErrorKind::WouldBlock
        | ErrorKind::UnexpectedEof => FrameError::Transport(err),
        _ => FrameError::Io(err),
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
