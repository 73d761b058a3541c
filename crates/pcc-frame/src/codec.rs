use std::time::Duration;

use bytes::{Buf, BufMut, BytesMut};

/// Size of the length prefix and of the count reply: one `u32`.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Default payload chunk size: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Append `value` in network byte order.
///
/// ```text
/// ┌───────────────┬────────────────────────┐
/// │ N (4B BE)     │ payload (N bytes)      │   client → server
/// └───────────────┴────────────────────────┘
/// ┌───────────────┐
/// │ C (4B BE)     │                            server → client
/// └───────────────┘
/// ```
pub fn encode_u32(value: u32, dst: &mut BytesMut) {
    dst.reserve(LENGTH_PREFIX_SIZE);
    dst.put_u32(value);
}

/// Decode a network-byte-order `u32` from a complete 4-byte header.
pub fn decode_u32(header: &[u8; LENGTH_PREFIX_SIZE]) -> u32 {
    let mut src = &header[..];
    src.get_u32()
}

/// Configuration for framed stream I/O.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Upper bound on bytes held in memory per payload read. Default: 1 MiB.
    pub chunk_size: usize,
    /// Read timeout for blocking operations. Default: none.
    pub read_timeout: Option<Duration>,
    /// Write timeout for blocking operations. Default: none.
    pub write_timeout: Option<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
