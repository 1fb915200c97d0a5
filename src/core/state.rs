//! Process-wide run state.
//!
//! - `SHUTDOWN`: Ctrl+C received
//! - `GRACEFUL`: a long-running loop (watch mode) polls `SHUTDOWN` itself
//!
//! Concurrent `run` invocations are kept apart by `batch::OutputLock`.

use std::sync::atomic::{AtomicBool, Ordering};

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Ctrl+C should set `SHUTDOWN` instead of exiting immediately
static GRACEFUL: AtomicBool = AtomicBool::new(false);

// =============================================================================
// SHUTDOWN state
// =============================================================================

/// Install the global Ctrl+C handler. Call once at program start.
///
/// Before `enable_graceful_shutdown()` the process exits at once; after it,
/// only the flag is set and the running loop winds down on its own.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if GRACEFUL.load(Ordering::SeqCst) {
            crate::log!("watch"; "shutting down...");
        } else {
            std::process::exit(130);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

pub fn enable_graceful_shutdown() {
    GRACEFUL.store(true, Ordering::SeqCst);
}

pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}
