//! Control Console Actor
//!
//! Reads commands from stdin, one per line:
//!
//! | Input           | Effect                         |
//! |-----------------|--------------------------------|
//! | `rs`            | restart the server             |
//! | `quit` / `exit` | final kill, then exit with 0   |
//!
//! Input is trimmed and case-insensitive; anything else is ignored. Ctrl+C is
//! handled by [`crate::core::setup_shutdown_handler`], not here.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::messages::{RestartReason, ShutdownReason, SupervisorMsg};

/// A recognized console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Restart,
    Quit,
}

impl ConsoleCommand {
    fn into_msg(self) -> SupervisorMsg {
        match self {
            Self::Restart => SupervisorMsg::Restart(RestartReason::Console),
            Self::Quit => SupervisorMsg::Shutdown(ShutdownReason::Console),
        }
    }
}

/// Parse one input line.
pub fn parse_command(line: &str) -> Option<ConsoleCommand> {
    match line.trim().to_lowercase().as_str() {
        "rs" => Some(ConsoleCommand::Restart),
        "quit" | "exit" => Some(ConsoleCommand::Quit),
        _ => None,
    }
}

/// Console Actor - translates stdin lines into supervisor triggers
pub struct ConsoleActor {
    supervisor_tx: mpsc::Sender<SupervisorMsg>,
}

impl ConsoleActor {
    pub fn new(supervisor_tx: mpsc::Sender<SupervisorMsg>) -> Self {
        Self { supervisor_tx }
    }

    /// Run until stdin closes or the supervisor is gone.
    ///
    /// EOF only ends the console; the watcher keeps running.
    pub async fn run(self) {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    crate::debug!("console: stdin closed");
                    break;
                }
                Err(e) => {
                    crate::debug!("console: read failed: {}", e);
                    break;
                }
            };

            let Some(command) = parse_command(&line) else {
                continue;
            };
            if self.supervisor_tx.send(command.into_msg()).await.is_err() {
                break;
            }
        }
    }
}
