use std::net::SocketAddr;
use std::sync::Arc;

use pcc_frame::FrameConfig;
use pcc_transport::{PccStream, TcpEndpoint};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::handler::{ConnectionHandler, Outcome};
use crate::shutdown::ShutdownCoordinator;
use crate::tally::CharTally;

/// Connection counters kept for the shutdown log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerStats {
    pub accepted: u64,
    pub completed: u64,
    pub aborted: u64,
}

/// Accepts and services PCC connections strictly one at a time.
pub struct PccServer {
    endpoint: TcpEndpoint,
    handler: ConnectionHandler,
    shutdown: Arc<ShutdownCoordinator>,
    stats: ServerStats,
}

impl PccServer {
    /// Bind to `addr` and register the wake address with `shutdown`.
    pub fn bind(addr: SocketAddr, shutdown: Arc<ShutdownCoordinator>) -> Result<Self> {
        let endpoint = TcpEndpoint::bind(addr)?;
        shutdown.set_wake_addr(endpoint.loopback_addr());
        Ok(Self {
            endpoint,
            handler: ConnectionHandler::new(),
            shutdown,
            stats: ServerStats::default(),
        })
    }

    /// Override the frame configuration (chunk size, timeouts).
    pub fn with_frame_config(mut self, config: FrameConfig) -> Self {
        self.handler = ConnectionHandler::with_config(config);
        self
    }

    /// Run the accept loop until shutdown is requested.
    ///
    /// Returns the aggregate tally on graceful shutdown. Errors are fatal:
    /// accept failures and non-transport I/O errors inside a connection.
    pub fn serve(&mut self) -> Result<CharTally> {
        loop {
            if self.shutdown.is_shutdown_requested() {
                break;
            }

            let (stream, peer) = self.endpoint.accept()?;
            if !self.shutdown.begin_connection() {
                debug!(%peer, "shutdown requested; dropping connection");
                stream.close();
                break;
            }

            self.stats.accepted += 1;
            let result = self.service(stream, peer);
            let shutdown_pending = self.shutdown.end_connection();
            result?;

            if shutdown_pending {
                break;
            }
        }

        info!(
            accepted = self.stats.accepted,
            completed = self.stats.completed,
            aborted = self.stats.aborted,
            "server shutting down"
        );
        Ok(self.handler.snapshot())
    }

    fn service(&mut self, stream: PccStream, peer: SocketAddr) -> Result<()> {
        let config = self.handler.config();
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;

        let mut stream = stream;
        let outcome = self.handler.handle(&mut stream);
        stream.close();

        match outcome? {
            Outcome::Completed { length, printable } => {
                self.stats.completed += 1;
                info!(%peer, length, printable, "connection completed");
            }
            Outcome::Aborted { stage, error } => {
                self.stats.aborted += 1;
                warn!(%peer, %stage, error = %error, "connection aborted; accepting new connections");
            }
        }
        Ok(())
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.endpoint.local_addr()
    }

    /// Borrow the aggregate tally.
    pub fn aggregate(&self) -> &CharTally {
        self.handler.aggregate()
    }

    /// Connection counters so far.
    pub fn stats(&self) -> ServerStats {
        self.stats
    }
}
