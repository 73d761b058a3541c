use std::io::{ErrorKind, Read, Write};
use std::net::SocketAddr;

use bytes::BytesMut;
use pcc_frame::{FrameConfig, FrameReader, FrameWriter};
use pcc_transport::TcpEndpoint;
use tracing::{debug, info};

use crate::error::{PeerError, Result};
use crate::source::PayloadSource;

/// Send `source` to the server at `addr` and return its printable count.
pub fn send_payload<P: PayloadSource>(addr: SocketAddr, source: &mut P) -> Result<u32> {
    send_payload_with_config(addr, source, &FrameConfig::default())
}

/// Send with explicit chunk size and timeouts.
///
/// One attempt only: any failure ends the exchange and is returned.
pub fn send_payload_with_config<P: PayloadSource>(
    addr: SocketAddr,
    source: &mut P,
    config: &FrameConfig,
) -> Result<u32> {
    check_length(source.remaining())?;

    info!(%addr, "connecting");
    let mut stream = TcpEndpoint::connect(addr)?;
    stream.set_read_timeout(config.read_timeout)?;
    stream.set_write_timeout(config.write_timeout)?;

    let result = exchange(&mut stream, source, config);
    stream.close();
    result
}

/// Run the client side of one exchange over an already connected stream.
pub fn exchange<T, P>(stream: &mut T, source: &mut P, config: &FrameConfig) -> Result<u32>
where
    T: Read + Write,
    P: PayloadSource,
{
    let length = check_length(source.remaining())?;

    let mut writer = FrameWriter::with_config(&mut *stream, config.clone());
    writer.write_u32(length)?;
    debug!(length, "sent payload length");

    let expected = u64::from(length);
    let window = expected.min(config.chunk_size.max(1) as u64) as usize;
    let mut buf = BytesMut::zeroed(window);
    let mut sent = 0u64;
    while sent < expected {
        let want = (expected - sent).min(window as u64) as usize;
        let read = match source.read_chunk(&mut buf[..want]) {
            Ok(0) => {
                return Err(PeerError::SourceTruncated {
                    expected,
                    read: sent,
                })
            }
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(PeerError::Source(err)),
        };
        writer.write_chunk(&buf[..read])?;
        sent += read as u64;
    }
    drop(writer);
    debug!(sent, "sent payload");

    let mut reader = FrameReader::with_config(&mut *stream, config.clone());
    let printable = reader.read_u32()?;
    debug!(printable, "received printable count");
    Ok(printable)
}

fn check_length(size: u64) -> Result<u32> {
    u32::try_from(size).map_err(|_| PeerError::PayloadTooLarge {
        size,
        max: u64::from(u32::MAX),
    })
}
