//! External process execution.
//!
//! Provides a Builder-based API for starting the supervised server, the
//! compile command and the kill-by-name tool.
//!
//! - [`runner`]: spawn with stdout/stderr forwarded verbatim, await the exit
//! - [`kill`]: terminate every process with a given name
//! - [`compile`]: run the optional compile step
//!
//! # Examples
//!
//! ```ignore
//! use crate::exec::Cmd;
//!
//! // Start and observe a process
//! let running = Cmd::new("./srv").spawn()?;
//! let exit = running.wait().await;
//!
//! // From an argv token list
//! let exit = Cmd::from_slice(&["make", "-j4"]).run().await?;
//! ```

mod compile;
mod error;
mod kill;
mod runner;

pub use compile::{CompileOutcome, compile};
pub use error::{KillError, SpawnError};
pub use kill::kill_by_name;
pub use runner::ProcessExit;

use std::ffi::{OsStr, OsString};

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Debug, Default, Clone)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    /// Start in a new process group (Unix only)
    own_group: bool,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Create from a command array (e.g., `["make"]` or `["cargo", "build"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let program = iter
            .next()
            .map(|s| s.as_ref().to_owned())
            .unwrap_or_default();
        let args: Vec<_> = iter.map(|s| s.as_ref().to_owned()).collect();
        Self {
            program,
            args,
            ..Default::default()
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Detach from our process group, so a terminal Ctrl+C reaches only us.
    ///
    /// No effect outside Unix.
    pub fn own_process_group(mut self) -> Self {
        self.own_group = true;
        self
    }

    /// Get the program name for error messages.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    fn command(&self) -> tokio::process::Command {
        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(&self.args);
        #[cfg(unix)]
        if self.own_group {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        tokio::process::Command::from(cmd)
    }
}

// ============================================================================
// Tests
// ============================================================================
