use std::fmt;
use std::io;

use pcc_frame::FrameError;
use pcc_peer::PeerError;
use pcc_transport::SocketError;

// Exit codes follow the sysexits/coreutils conventions.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn socket_error(context: &str, err: SocketError) -> CliError {
    match err {
        SocketError::Bind { source, .. }
        | SocketError::Connect { source, .. }
        | SocketError::Accept(source)
        | SocketError::Io(source) => io_error(context, source),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    let message = format!("{context}: {err}");
    match err {
        FrameError::Transport(source)
            if matches!(
                source.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ) =>
        {
            CliError::new(TIMEOUT, message)
        }
        FrameError::Transport(_) | FrameError::ConnectionClosed { .. } => {
            CliError::new(TRANSPORT_ERROR, message)
        }
        FrameError::Io(source) => io_error(context, source),
    }
}

pub fn peer_error(context: &str, err: PeerError) -> CliError {
    match err {
        PeerError::Socket(err) => socket_error(context, err),
        PeerError::Frame(err) => frame_error(context, err),
        PeerError::Connection { stage, source } => {
            frame_error(&format!("{context} while {stage}"), source)
        }
        PeerError::PayloadTooLarge { .. } | PeerError::SourceTruncated { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        PeerError::Source(source) => io_error(context, source),
    }
}
