use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use pcc_transport::TcpEndpoint;
use tracing::{debug, warn};

/// What an interrupt did when it was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownAction {
    /// No connection was live: the accept loop was woken and exits now.
    Immediate,
    /// A connection was live: the accept loop exits once it finishes.
    Deferred,
}

/// Shared between the accept loop and the interrupt handler.
///
/// Two flags, both `SeqCst`. The accept loop sets `active` and then reads
/// `requested`; the interrupt sets `requested` and then reads `active`. At
/// least one side always observes the other, so either the loop refuses the
/// new connection or the interrupt defers to it. A connection is never cut
/// short and merged counts are never lost.
#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    active: AtomicBool,
    requested: AtomicBool,
    wake_addr: OnceLock<SocketAddr>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address the interrupt path dials to unblock a pending `accept`.
    pub fn set_wake_addr(&self, addr: SocketAddr) {
        if self.wake_addr.set(addr).is_err() {
            debug!(%addr, "wake address already set");
        }
    }

    /// Called from the interrupt handler.
    pub fn request_shutdown(&self) -> ShutdownAction {
        self.requested.store(true, Ordering::SeqCst);
        if self.active.load(Ordering::SeqCst) {
            debug!("shutdown deferred until the current connection ends");
            return ShutdownAction::Deferred;
        }
        self.wake();
        ShutdownAction::Immediate
    }

    /// Mark a freshly accepted connection live.
    ///
    /// Returns `false` if shutdown was already requested; the caller must then
    /// drop the connection and stop.
    pub fn begin_connection(&self) -> bool {
        self.active.store(true, Ordering::SeqCst);
        if self.requested.load(Ordering::SeqCst) {
            self.active.store(false, Ordering::SeqCst);
            return false;
        }
        true
    }

    /// Mark the live connection finished. Returns whether shutdown is pending.
    pub fn end_connection(&self) -> bool {
        self.active.store(false, Ordering::SeqCst);
        self.requested.load(Ordering::SeqCst)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    fn wake(&self) {
        let Some(addr) = self.wake_addr.get().copied() else {
            return;
        };
        match TcpEndpoint::connect(addr) {
            Ok(stream) => stream.close(),
            Err(err) => warn!(error = %err, "failed to wake accept loop"),
        }
    }
}
