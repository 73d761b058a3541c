use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};

use tracing::{debug, info};

use crate::error::{Result, SocketError};
use crate::stream::PccStream;

/// A listening TCP socket.
///
/// `std` sets `SO_REUSEADDR` on Unix before binding.
pub struct TcpEndpoint {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpEndpoint {
    /// Bind and listen on `addr`. Port 0 picks an ephemeral port.
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).map_err(|source| SocketError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| SocketError::Bind { addr, source })?;

        info!(%local_addr, "listening on tcp socket");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<(PccStream, SocketAddr)> {
        let (stream, peer) = self.listener.accept().map_err(SocketError::Accept)?;
        debug!(%peer, "accepted connection");
        Ok((PccStream::from_tcp(stream), peer))
    }

    /// Connect to a listening endpoint (blocking).
    pub fn connect(addr: SocketAddr) -> Result<PccStream> {
        let stream = TcpStream::connect(addr).map_err(|source| SocketError::Connect { addr, source })?;
        debug!(%addr, "connected to tcp socket");
        Ok(PccStream::from_tcp(stream))
    }

    /// The address this endpoint is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// An address a process on this host can dial to reach the endpoint.
    ///
    /// Wildcard binds (`0.0.0.0`, `::`) are mapped to the loopback address.
    pub fn loopback_addr(&self) -> SocketAddr {
        let ip = match self.local_addr.ip() {
            IpAddr::V4(v4) if v4.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(v6) if v6.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
            ip => ip,
        };
        SocketAddr::new(ip, self.local_addr.port())
    }
}
