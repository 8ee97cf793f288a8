//! Supervisor Actor
//!
//! Runs the kill → compile → run cycle for the configured server.
//!
//! ```text
//! SupervisorMsg ──> Lifecycle::handle (pure) ──> Action ──> perform (I/O)
//!       ^                                                      │
//!       └──────────── KillDone / CompileDone / ServerExited ───┘
//! ```
//!
//! Kill and compile steps run as tasks and report back through the mailbox.
//! Spawning the server is synchronous, so its result is applied before the
//! next message is read: the `ServerExited` of a child can never be observed
//! ahead of its `ServerStarted`.

mod machine;

#[cfg(test)]
mod tests;

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc;

use super::messages::{CycleId, RestartReason, SupervisorMsg};
use crate::config::WatcherConfig;
use crate::exec::{Cmd, compile, kill_by_name};

use machine::{Action, Lifecycle};

/// Supervisor Actor - owns the lifecycle and executes its actions
pub struct SupervisorActor {
    /// Single mailbox for triggers and step results
    rx: mpsc::Receiver<SupervisorMsg>,
    /// Handed to step tasks so they can report back
    tx: mpsc::Sender<SupervisorMsg>,
    config: Arc<WatcherConfig>,
    lifecycle: Lifecycle,
}

impl SupervisorActor {
    pub fn new(
        rx: mpsc::Receiver<SupervisorMsg>,
        tx: mpsc::Sender<SupervisorMsg>,
        config: Arc<WatcherConfig>,
    ) -> Self {
        let lifecycle = Lifecycle::new(config.compile.is_configured());
        Self {
            rx,
            tx,
            config,
            lifecycle,
        }
    }

    /// Run the startup cycle and the event loop. Returns the exit code.
    pub async fn run(mut self) -> i32 {
        let mut pending: VecDeque<Action> = self.lifecycle.start().into();

        loop {
            while let Some(action) = pending.pop_front() {
                if let Some(code) = self.perform(action, &mut pending) {
                    crate::debug!("supervisor stopped (exit code {})", code);
                    return code;
                }
            }

            // We hold a sender ourselves, so the channel never closes.
            let Some(msg) = self.rx.recv().await else {
                return 0;
            };
            log_trigger(&msg);
            pending.extend(self.lifecycle.handle(msg));
            crate::debug!("phase: {:?}", self.lifecycle.phase());
        }
    }

    /// Execute one action. Returns `Some(code)` when the program should exit.
    fn perform(&mut self, action: Action, pending: &mut VecDeque<Action>) -> Option<i32> {
        match action {
            Action::Notify(notice) => {
                if notice.is_error() {
                    crate::error!("{}", notice);
                } else {
                    crate::log!("{}", notice);
                }
            }
            Action::Kill(cycle) => {
                let name = self.config.identity.name().to_owned();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = kill_by_name(&name).await;
                    let _ = tx.send(SupervisorMsg::KillDone { cycle, result }).await;
                });
            }
            Action::Compile(cycle) => {
                let config = Arc::clone(&self.config);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let outcome = compile(&config.compile).await;
                    let _ = tx.send(SupervisorMsg::CompileDone { cycle, outcome }).await;
                });
            }
            Action::Spawn(cycle) => {
                let msg = self.spawn_server(cycle);
                pending.extend(self.lifecycle.handle(msg));
            }
            Action::FinalKill => {
                let name = self.config.identity.name().to_owned();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = kill_by_name(&name).await;
                    let _ = tx.send(SupervisorMsg::FinalKillDone { result }).await;
                });
            }
            Action::Exit(code) => return Some(code),
        }
        None
    }

    /// Start the server and a task reporting its exit.
    fn spawn_server(&self, cycle: CycleId) -> SupervisorMsg {
        crate::debug!("spawning server: {}", self.config.server.display());

        // Own process group: a terminal Ctrl+C must not kill the server before
        // the supervisor has marked the final kill as its own.
        match Cmd::new(&self.config.server).own_process_group().spawn() {
            Ok(running) => {
                crate::debug!("server started (pid {:?})", running.id());
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let exit = running.wait().await;
                    crate::debug!("server exited with {}", exit);
                    let _ = tx.send(SupervisorMsg::ServerExited { exit }).await;
                });
                SupervisorMsg::ServerStarted { cycle }
            }
            Err(error) => SupervisorMsg::ServerSpawnFailed { cycle, error },
        }
    }
}

fn log_trigger(msg: &SupervisorMsg) {
    match msg {
        SupervisorMsg::Restart(RestartReason::FileChanged(path)) => {
            crate::debug!("restart: {} changed", path.display());
        }
        SupervisorMsg::Restart(RestartReason::Console) => {
            crate::debug!("restart: requested from console");
        }
        SupervisorMsg::Shutdown(reason) => {
            crate::debug!("shutdown: {:?}", reason);
        }
        _ => {}
    }
}
