//! Cooperative stop requests.
//!
//! A `StopHandle` is checked by the frame loop between cycles; setting it
//! never interrupts a cycle that is already running.  SIGINT/SIGTERM set a
//! process-wide flag that every handle also observes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Global flag set by SIGTERM/SIGINT handlers.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Install signal handlers for graceful shutdown (SIGTERM, SIGINT).
pub fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGTERM, signal_handler as libc::sighandler_t);
        libc::signal(libc::SIGINT, signal_handler as libc::sighandler_t);
    }
}

extern "C" fn signal_handler(_sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Whether a termination signal has been received.
pub fn signal_received() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}

/// Cloneable stop flag shared between the loop and whoever owns it.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst) || signal_received()
    }
}
