//! Actor Message Definitions
//!
//! Everything flows into the single supervisor mailbox:
//!
//! ```text
//! FsActor ──Restart──┐
//! Console ──Restart──┼──> SupervisorActor ──spawns──> kill / compile / run tasks
//! Ctrl+C ──Shutdown──┘            ^                          │
//!                                 └──────step results────────┘
//! ```

use std::path::PathBuf;

use crate::exec::{CompileOutcome, KillError, ProcessExit, SpawnError};

/// Identifier of one kill → compile → run cycle. Strictly increasing.
pub type CycleId = u64;

/// Why a restart was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartReason {
    /// A watched file changed
    FileChanged(PathBuf),
    /// The user typed `rs`
    Console,
}

/// Why the program is shutting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The user typed `quit` or `exit`
    Console,
    /// Ctrl+C
    Interrupt,
    /// The startup cycle could not kill or compile
    Fatal,
}

impl ShutdownReason {
    /// Process exit code for this shutdown.
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Console | Self::Interrupt => 0,
            Self::Fatal => 1,
        }
    }
}

/// Messages to the Supervisor Actor
#[derive(Debug)]
pub enum SupervisorMsg {
    /// Run a new cycle
    Restart(RestartReason),
    /// Final kill, then exit
    Shutdown(ShutdownReason),
    /// Kill step of `cycle` finished
    KillDone {
        cycle: CycleId,
        result: Result<(), KillError>,
    },
    /// Compile step of `cycle` finished
    CompileDone {
        cycle: CycleId,
        outcome: CompileOutcome,
    },
    /// The server of `cycle` is running
    ServerStarted { cycle: CycleId },
    /// The server of `cycle` could not be started
    ServerSpawnFailed { cycle: CycleId, error: SpawnError },
    /// A server we spawned exited
    ServerExited { exit: ProcessExit },
    /// The shutdown kill finished
    FinalKillDone { result: Result<(), KillError> },
}
