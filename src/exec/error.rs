//! Process execution errors.

use thiserror::Error;

/// The program could not be started (not found, not executable, ...).
#[derive(Debug, Error)]
#[error("failed to spawn `{program}`: {source}")]
pub struct SpawnError {
    pub program: String,
    #[source]
    pub source: std::io::Error,
}

/// The kill-by-name tool itself could not be run.
///
/// "No process matched" is not an error: the tool ran and reported it.
#[derive(Debug, Error)]
#[error("failed to kill `{name}`: {source}")]
pub struct KillError {
    pub name: String,
    #[source]
    pub source: std::io::Error,
}
