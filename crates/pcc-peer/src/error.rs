use crate::handler::ConnectionState;

/// Errors that can occur in peer operations.
///
/// Only [`PeerError::Frame`] with a transport cause is scoped to a single
/// connection; see [`PeerError::is_transport`].
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// Socket setup failed (bind, accept, connect, socket options).
    #[error("socket error: {0}")]
    Socket(#[from] pcc_transport::SocketError),

    /// Frame-level error outside a server connection (client side).
    #[error("frame error: {0}")]
    Frame(#[from] pcc_frame::FrameError),

    /// Non-transport I/O failure while servicing a connection.
    #[error("fatal I/O error while {stage}: {source}")]
    Connection {
        stage: ConnectionState,
        source: pcc_frame::FrameError,
    },

    /// The payload does not fit the 32-bit length prefix.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: u64, max: u64 },

    /// The payload source ran dry before the announced length was sent.
    #[error("payload source ended after {read} of {expected} bytes")]
    SourceTruncated { expected: u64, read: u64 },

    /// Reading from the payload source failed.
    #[error("payload source read failed: {0}")]
    Source(std::io::Error),
}

impl PeerError {
    /// Whether the failure came from the remote peer or network path.
    pub fn is_transport(&self) -> bool {
        match self {
            PeerError::Frame(err) => err.is_transport(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, PeerError>;
