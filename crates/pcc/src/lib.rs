//! Printable character counter over TCP.
//!
//! A client streams a file to a server as a 4-byte big-endian length
//! followed by the raw bytes; the server replies with the number of bytes in
//! the printable ASCII range and keeps a per-character tally across
//! connections, printed when it is interrupted.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP listener, connector and stream type
//! - [`frame`]: Length prefix codec and exact-length stream I/O
//! - [`peer`]: Connection handler, aggregate tally, shutdown, sender

/// Re-export transport types.
pub mod transport {
    pub use pcc_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use pcc_frame::*;
}

/// Re-export peer types.
pub mod peer {
    pub use pcc_peer::*;
}
