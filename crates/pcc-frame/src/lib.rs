//! Length-prefixed framing and exact-length stream I/O for PCC.
//!
//! One PCC exchange on the wire:
//! - client sends a 4-byte big-endian payload length `N`
//! - client sends exactly `N` payload bytes
//! - server replies with a 4-byte big-endian printable count `C`
//!
//! A single `read`/`write` on a stream socket may move fewer bytes than
//! asked for. Everything here loops until the exact amount has moved, and
//! reports failures as either connection-scoped (see
//! [`FrameError::is_transport`]) or fatal.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{decode_u32, encode_u32, FrameConfig, DEFAULT_CHUNK_SIZE, LENGTH_PREFIX_SIZE};
pub use error::{classify, FrameError, Result};
pub use reader::{recv_exact, FrameReader};
pub use writer::{send_exact, FrameWriter};
