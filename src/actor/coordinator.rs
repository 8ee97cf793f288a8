//! Actor Coordinator - Wires up the Watcher Actor System
//!
//! # Responsibility
//!
//! The Coordinator is a **thin orchestrator** that:
//! - Creates the supervisor mailbox
//! - Wires up actors and the Ctrl+C trigger
//! - Runs them until the supervisor decides to exit
//!
//! It does NOT contain lifecycle logic - that lives in `supervisor/`.
//!
//! # Architecture
//!
//! ```text
//! FsActor ──────┐
//! ConsoleActor ─┼──> SupervisorActor ──> exit code
//! Ctrl+C ───────┘
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use super::console::ConsoleActor;
use super::fs::FsActor;
use super::messages::SupervisorMsg;
use super::supervisor::SupervisorActor;
use crate::config::WatcherConfig;

/// Channel buffer size
const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system
pub struct Coordinator {
    config: Arc<WatcherConfig>,
}

impl Coordinator {
    /// Create from Arc<WatcherConfig>
    pub fn with_config(config: Arc<WatcherConfig>) -> Self {
        Self { config }
    }

    /// Run the actor system. Returns the process exit code.
    pub async fn run(self) -> Result<i32> {
        let (supervisor_tx, supervisor_rx) = mpsc::channel::<SupervisorMsg>(CHANNEL_BUFFER);
        crate::core::register_supervisor(supervisor_tx.clone());

        // Watcher first, so changes made during the startup cycle are not lost
        let fs_actor = FsActor::new(Arc::clone(&self.config), supervisor_tx.clone())
            .context("failed to start file watcher")?;
        let console_actor = ConsoleActor::new(supervisor_tx.clone());
        let supervisor = SupervisorActor::new(supervisor_rx, supervisor_tx, self.config);

        crate::debug!("actor: start");
        let code = run_actors(fs_actor, console_actor, supervisor).await;
        crate::debug!("actor: stopped");

        Ok(code)
    }
}

/// Run all actors concurrently until the supervisor returns
async fn run_actors(fs: FsActor, console: ConsoleActor, supervisor: SupervisorActor) -> i32 {
    let fs_handle = tokio::spawn(async move { fs.run().await });
    let console_handle = tokio::spawn(async move { console.run().await });

    let code = supervisor.run().await;

    fs_handle.abort();
    console_handle.abort();
    code
}
