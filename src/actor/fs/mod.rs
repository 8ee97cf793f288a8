//! FileSystem Actor
//!
//! Watches the working directory and sends a restart trigger to the
//! SupervisorActor for every actionable change. There is no debounce window:
//! each notify event with at least one actionable path is one trigger.
//!
//! Architecture:
//! ```text
//! Watcher → ChangeKind (drop noise) → ChangeFilter (patterns) → SupervisorMsg
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::messages::{RestartReason, SupervisorMsg};
use crate::config::WatcherConfig;

// Path filtering (patterns, ignore patterns, directories).
mod filter;
// Shared fs event types.
mod types;


pub use filter::ChangeFilter;
use types::ChangeKind;

/// Buffer between the notify thread and the actor.
const EVENT_BUFFER: usize = 64;

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    _watcher: RecommendedWatcher,
    /// Channel to send triggers to SupervisorActor
    supervisor_tx: mpsc::Sender<SupervisorMsg>,
    filter: ChangeFilter,
}

impl FsActor {
    /// Create a new FsActor watching `config.root` recursively.
    ///
    /// The watcher starts immediately; events buffer in the channel until
    /// [`FsActor::run`] is polled.
    pub fn new(
        config: Arc<WatcherConfig>,
        supervisor_tx: mpsc::Sender<SupervisorMsg>,
    ) -> notify::Result<Self> {
        // Create sync channel for notify (it doesn't support async)
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;
        watcher.watch(&config.root, RecursiveMode::Recursive)?;
        crate::debug!("watching {}", config.root.display());

        Ok(Self {
            notify_rx,
            _watcher: watcher,
            supervisor_tx,
            filter: ChangeFilter::from_config(&config),
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let notify_rx = self.notify_rx;
        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(EVENT_BUFFER);

        // Spawn a thread to poll notify events and send to async channel
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::error!("watch error: {}", e),
                }
            }
        });

        while let Some(event) = async_rx.recv().await {
            // Supervisor is already stopping, nothing left to restart
            if crate::core::is_shutdown() {
                continue;
            }
            let Some(path) = actionable_path(&event, &self.filter) else {
                continue;
            };
            let msg = SupervisorMsg::Restart(RestartReason::FileChanged(path));
            if self.supervisor_tx.send(msg).await.is_err() {
                break; // Supervisor shut down
            }
        }
    }
}

/// Echo the event and return its first actionable path, if any.
fn actionable_path(event: &notify::Event, filter: &ChangeFilter) -> Option<PathBuf> {
    let kind = ChangeKind::from_event(&event.kind)?;

    let mut actionable = None;
    for path in &event.paths {
        crate::debug!("new event: {} was {}", path.display(), kind.label());
        if actionable.is_none() && filter.is_actionable(path) {
            actionable = Some(path.clone());
        }
    }
    actionable
}
