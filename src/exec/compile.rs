//! Compile step: run the configured build command, if any.

use super::{Cmd, ProcessExit, SpawnError};
use crate::config::CompileStep;

/// Result of the compile step. Never an `Err`: failures are outcomes.
#[derive(Debug)]
pub enum CompileOutcome {
    /// No compile command configured (implicit success)
    Skipped,
    /// The command ran and exited
    Finished(ProcessExit),
    /// The command could not be started
    SpawnFailed(SpawnError),
}

impl CompileOutcome {
    /// Only a skipped step or exit code 0 lets the server start.
    pub fn is_success(&self) -> bool {
        match self {
            Self::Skipped => true,
            Self::Finished(exit) => exit.success(),
            Self::SpawnFailed(_) => false,
        }
    }
}

/// Run the compile step with output forwarded to our own streams.
pub async fn compile(step: &CompileStep) -> CompileOutcome {
    let Some(tokens) = step.tokens() else {
        return CompileOutcome::Skipped;
    };

    crate::debug!("spawning compile command: {}", step);
    match Cmd::from_slice(tokens).run().await {
        Ok(exit) => CompileOutcome::Finished(exit),
        Err(e) => CompileOutcome::SpawnFailed(e),
    }
}
