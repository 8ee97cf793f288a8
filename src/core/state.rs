//! Process-wide shutdown state.
//!
//! - `SHUTDOWN`: Has shutdown been requested? (Ctrl+C received)
//!
//! The first Ctrl+C asks the supervisor for a clean shutdown (final kill,
//! exit 0). A second one exits immediately.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use crate::actor::messages::{ShutdownReason, SupervisorMsg};

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Supervisor mailbox, for the interrupt trigger
static SUPERVISOR_TX: OnceLock<mpsc::Sender<SupervisorMsg>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
///
/// The handler behavior depends on whether a supervisor has been registered:
/// - Before `register_supervisor()`: nothing to stop yet, exit immediately
/// - After `register_supervisor()`: send `Shutdown(Interrupt)` to the supervisor
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        if !begin_shutdown() {
            // Second Ctrl+C: the user does not want to wait for the final kill
            std::process::exit(0);
        }

        match SUPERVISOR_TX.get() {
            Some(tx) => {
                let _ = tx.blocking_send(SupervisorMsg::Shutdown(ShutdownReason::Interrupt));
            }
            None => std::process::exit(0),
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the supervisor mailbox for graceful shutdown
pub fn register_supervisor(tx: mpsc::Sender<SupervisorMsg>) {
    let _ = SUPERVISOR_TX.set(tx);
}

/// Mark shutdown as requested. Returns `false` if it already was.
fn begin_shutdown() -> bool {
    !SHUTDOWN.swap(true, Ordering::SeqCst)
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

// =============================================================================
// Tests
// =============================================================================
