//! Lifecycle state machine.
//!
//! Pure transition logic: [`Lifecycle::handle`] consumes one message and
//! returns the [`Action`]s to perform. No I/O happens here, which keeps the
//! ordering rules testable without real processes.
//!
//! ```text
//!            trigger                kill done             compile ok
//!   Idle ───────────────> Killing ─────────────> Compiling ───────────> Running
//!    ^                     ^  │ (no compile step) ──────────────────────>  │
//!    │                     │  └─ trigger: re-run once kill completes       │
//!    │   compile failed    │                                               │
//!    ├─────────────────────┼──────────────── Compiling                     │
//!    │   server exited     │ trigger (any other phase): kill immediately   │
//!    └─────────────────────┴───────────────────────────────────────────────┘
//!
//!   any phase ──shutdown──> Exiting ──final kill done──> exit(code)
//! ```
//!
//! # Self-kill flag
//!
//! `kill_signal_sent` is set before every kill action is returned, and read
//! then cleared by the next observed server exit. A non-zero exit with the
//! flag clear is a crash and produces a warning. All reads and writes happen
//! on the supervisor task, in mailbox order, so the set always happens-before
//! the read of the exit it is meant to cover.

use std::fmt;

use crate::actor::messages::{CycleId, ShutdownReason, SupervisorMsg};
use crate::exec::{CompileOutcome, KillError, ProcessExit, SpawnError};

/// Supervisor phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Killing,
    Compiling,
    Running,
    Exiting,
}

/// User-facing log line produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Starting,
    Restarting,
    KillFailed(String),
    CompileFailed,
    CompileSpawnFailed(String),
    SpawnFailed(String),
    ServerCrashed(ProcessExit),
    Exiting,
}

impl Notice {
    /// Errors go to stderr in red, the rest to stdout.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Starting | Self::Restarting | Self::Exiting)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => f.write_str("recompiling and starting server"),
            Self::Restarting => f.write_str("recompiling and restarting server"),
            Self::KillFailed(e) | Self::CompileSpawnFailed(e) | Self::SpawnFailed(e) => {
                f.write_str(e)
            }
            Self::CompileFailed => {
                f.write_str("compilation errors, waiting for file changes before restarting")
            }
            Self::ServerCrashed(_) => f.write_str("server exiting with errors, type 'rs' to restart"),
            Self::Exiting => f.write_str("exiting"),
        }
    }
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Notify(Notice),
    Kill(CycleId),
    Compile(CycleId),
    Spawn(CycleId),
    FinalKill,
    Exit(i32),
}

/// Kill → compile → run sequencing and exit-code policy.
#[derive(Debug)]
pub struct Lifecycle {
    phase: Phase,
    /// Current cycle; results tagged with an older id are stale
    cycle: CycleId,
    /// The current cycle is the one started at launch
    startup: bool,
    /// A trigger arrived while killing
    rerun_pending: bool,
    kill_signal_sent: bool,
    /// Spawned servers whose exit has not been observed yet
    live_servers: usize,
    has_compile_step: bool,
    exit_code: i32,
}

impl Lifecycle {
    pub fn new(has_compile_step: bool) -> Self {
        Self {
            phase: Phase::Idle,
            cycle: 0,
            startup: false,
            rerun_pending: false,
            kill_signal_sent: false,
            live_servers: 0,
            has_compile_step,
            exit_code: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[cfg(test)]
    pub fn kill_signal_sent(&self) -> bool {
        self.kill_signal_sent
    }

    #[cfg(test)]
    pub fn rerun_pending(&self) -> bool {
        self.rerun_pending
    }

    /// Begin the startup cycle.
    pub fn start(&mut self) -> Vec<Action> {
        self.startup = true;
        self.begin_cycle(Notice::Starting)
    }

    /// Apply one message and return the actions it requires.
    pub fn handle(&mut self, msg: SupervisorMsg) -> Vec<Action> {
        if self.phase == Phase::Exiting {
            return self.handle_exiting(msg);
        }

        match msg {
            SupervisorMsg::Restart(_) => self.on_restart(),
            SupervisorMsg::Shutdown(reason) => self.shutdown(reason),
            SupervisorMsg::KillDone { cycle, result } => self.on_kill_done(cycle, result),
            SupervisorMsg::CompileDone { cycle, outcome } => self.on_compile_done(cycle, outcome),
            SupervisorMsg::ServerStarted { cycle } => self.on_server_started(cycle),
            SupervisorMsg::ServerSpawnFailed { cycle, error } => self.on_spawn_failed(cycle, error),
            SupervisorMsg::ServerExited { exit } => self.on_server_exited(exit),
            SupervisorMsg::FinalKillDone { .. } => Vec::new(),
        }
    }

    fn handle_exiting(&mut self, msg: SupervisorMsg) -> Vec<Action> {
        match msg {
            SupervisorMsg::FinalKillDone { result } => {
                let mut actions = Vec::new();
                if let Err(e) = result {
                    actions.push(Action::Notify(Notice::KillFailed(e.to_string())));
                }
                actions.push(Action::Exit(self.exit_code));
                actions
            }
            SupervisorMsg::ServerExited { .. } => {
                self.live_servers = self.live_servers.saturating_sub(1);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn begin_cycle(&mut self, notice: Notice) -> Vec<Action> {
        self.cycle += 1;
        self.phase = Phase::Killing;
        self.rerun_pending = false;
        // must be set before the kill is issued
        self.kill_signal_sent = true;
        vec![Action::Notify(notice), Action::Kill(self.cycle)]
    }

    fn on_restart(&mut self) -> Vec<Action> {
        if self.phase == Phase::Killing {
            self.rerun_pending = true;
            return Vec::new();
        }
        self.startup = false;
        self.begin_cycle(Notice::Restarting)
    }

    fn on_kill_done(&mut self, cycle: CycleId, result: Result<(), KillError>) -> Vec<Action> {
        if cycle != self.cycle || self.phase != Phase::Killing {
            return Vec::new();
        }

        let mut actions = Vec::new();
        if let Err(e) = result {
            let notice = Notice::KillFailed(e.to_string());
            if self.startup {
                return self.fatal(notice);
            }
            actions.push(Action::Notify(notice));
        }

        if self.rerun_pending {
            self.startup = false;
            actions.extend(self.begin_cycle(Notice::Restarting));
        } else if self.has_compile_step {
            self.phase = Phase::Compiling;
            actions.push(Action::Compile(cycle));
        } else {
            self.phase = Phase::Running;
            actions.push(Action::Spawn(cycle));
        }
        actions
    }

    fn on_compile_done(&mut self, cycle: CycleId, outcome: CompileOutcome) -> Vec<Action> {
        if cycle != self.cycle || self.phase != Phase::Compiling {
            return Vec::new();
        }

        if outcome.is_success() {
            self.phase = Phase::Running;
            return vec![Action::Spawn(cycle)];
        }

        let mut actions = Vec::new();
        if let CompileOutcome::SpawnFailed(e) = outcome {
            let notice = Notice::CompileSpawnFailed(e.to_string());
            if self.startup {
                return self.fatal(notice);
            }
            actions.push(Action::Notify(notice));
        }

        self.phase = Phase::Idle;
        self.startup = false;
        actions.push(Action::Notify(Notice::CompileFailed));
        actions
    }

    fn on_server_started(&mut self, cycle: CycleId) -> Vec<Action> {
        // Nothing alive and no kill in flight: no exit can be blamed on an
        // earlier kill any more.
        if self.live_servers == 0 && self.phase != Phase::Killing {
            self.kill_signal_sent = false;
        }
        self.live_servers += 1;

        if cycle == self.cycle && self.phase == Phase::Running {
            self.startup = false;
        }
        Vec::new()
    }

    fn on_spawn_failed(&mut self, cycle: CycleId, error: SpawnError) -> Vec<Action> {
        if cycle == self.cycle && self.phase == Phase::Running {
            self.phase = Phase::Idle;
            self.startup = false;
        }
        vec![Action::Notify(Notice::SpawnFailed(error.to_string()))]
    }

    fn on_server_exited(&mut self, exit: ProcessExit) -> Vec<Action> {
        self.live_servers = self.live_servers.saturating_sub(1);

        let mut actions = Vec::new();
        if !exit.success() && !self.kill_signal_sent {
            actions.push(Action::Notify(Notice::ServerCrashed(exit)));
        }
        self.kill_signal_sent = false;

        if self.phase == Phase::Running && self.live_servers == 0 {
            self.phase = Phase::Idle;
        }
        actions
    }

    fn shutdown(&mut self, reason: ShutdownReason) -> Vec<Action> {
        self.phase = Phase::Exiting;
        self.exit_code = reason.exit_code();
        self.kill_signal_sent = true;

        let mut actions = Vec::new();
        if reason != ShutdownReason::Fatal {
            actions.push(Action::Notify(Notice::Exiting));
        }
        actions.push(Action::FinalKill);
        actions
    }

    fn fatal(&mut self, notice: Notice) -> Vec<Action> {
        let mut actions = vec![Action::Notify(notice)];
        actions.extend(self.shutdown(ShutdownReason::Fatal));
        actions
    }
}
