//! Server and client roles of the PCC protocol.
//!
//! The server side is a [`PccServer`] accepting one connection at a time and
//! running each through a [`ConnectionHandler`], which counts printable bytes
//! into a per-connection [`CharTally`] and merges it into the aggregate only
//! after the reply went out. A [`ShutdownCoordinator`] decides whether an
//! interrupt ends the process right away or after the live connection.
//!
//! The client side is [`send_payload`], which streams a [`PayloadSource`]
//! and returns the server's count.

pub mod error;
pub mod handler;
pub mod sender;
pub mod server;
pub mod shutdown;
pub mod source;
pub mod tally;

pub use error::{PeerError, Result};
pub use handler::{ConnectionHandler, ConnectionState, Outcome};
pub use sender::{exchange, send_payload, send_payload_with_config};
pub use server::{PccServer, ServerStats};
pub use shutdown::{ShutdownAction, ShutdownCoordinator};
pub use source::{FileSource, PayloadSource, SliceSource};
pub use tally::{CharCount, CharTally, MAX_PRINTABLE, MIN_PRINTABLE, PRINTABLE_COUNT};
