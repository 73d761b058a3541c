//! Blocking TCP transport for the PCC protocol.
//!
//! This is the lowest layer of pcc. It owns socket setup (bind, listen,
//! accept, connect) and hands out [`PccStream`] values that the framing
//! layer reads from and writes to.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, SocketError};
pub use stream::PccStream;
pub use tcp::TcpEndpoint;
