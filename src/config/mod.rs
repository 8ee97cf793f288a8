//! Watcher configuration.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── compile     # CompileStep (optional build command)
//! ├── error       # ConfigError
//! ├── file        # server-watcher.toml
//! ├── identity    # ServerIdentity (process name)
//! ├── patterns    # PatternSet (watch / ignore globs)
//! └── mod.rs      # WatcherConfig (this file)
//! ```
//!
//! The configuration is built once at startup from CLI flags merged over the
//! optional config file, then shared read-only for the process lifetime.

mod compile;
mod error;
mod file;
mod identity;
mod patterns;

pub use compile::CompileStep;
pub use error::ConfigError;
pub use file::FileConfig;
pub use identity::ServerIdentity;
pub use patterns::{DEFAULT_WATCH_PATTERN, PatternSet};

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::Cli;

/// Immutable runtime configuration.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Watch root (working directory at startup)
    pub root: PathBuf,
    /// Server executable, as given by the user
    pub server: PathBuf,
    /// Base name of `server`, used to label logs and to kill by name
    pub identity: ServerIdentity,
    pub compile: CompileStep,
    /// Inclusion patterns (default `**/*`)
    pub patterns: PatternSet,
    /// Exclusion patterns
    pub ignore: PatternSet,
    pub ignore_directories: bool,
    pub verbose: bool,
}

impl WatcherConfig {
    /// Load configuration from CLI arguments and the optional config file.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = std::env::current_dir().context("Failed to get current working directory")?;
        let file = FileConfig::locate(cli.config.as_deref(), &root)?.unwrap_or_default();
        Ok(Self::from_parts(cli, file, root)?)
    }

    /// Merge CLI flags over file values and validate.
    pub fn from_parts(cli: &Cli, file: FileConfig, root: PathBuf) -> Result<Self, ConfigError> {
        let server = cli
            .server
            .clone()
            .or(file.server)
            .filter(|s| !s.as_os_str().is_empty())
            .ok_or_else(|| {
                ConfigError::Validation("no server given, use --server <path>".into())
            })?;
        let identity = ServerIdentity::from_path(&server)?;

        let compile = CompileStep::parse(
            cli.compilation_command
                .as_deref()
                .or(file.compilation_command.as_deref()),
        );

        let patterns = if !cli.patterns.is_empty() {
            cli.patterns.clone()
        } else {
            file.patterns
                .unwrap_or_else(|| vec![DEFAULT_WATCH_PATTERN.to_string()])
        };
        let ignore_patterns = if !cli.ignore_patterns.is_empty() {
            cli.ignore_patterns.clone()
        } else {
            file.ignore_patterns.unwrap_or_default()
        };

        Ok(Self {
            patterns: PatternSet::new(&root, &patterns)?,
            ignore: PatternSet::new(&root, &ignore_patterns)?,
            root,
            server,
            identity,
            compile,
            ignore_directories: cli.ignore_directories || file.ignore_directories,
            verbose: cli.verbose || file.verbose,
        })
    }

    /// Echo the effective configuration (verbose mode only).
    pub fn print_summary(&self) {
        for (key, value) in self.summary() {
            crate::debug!("{}: {}", key, value);
        }
    }

    fn summary(&self) -> [(&'static str, String); 6] {
        [
            ("patterns", self.patterns.to_string()),
            ("ignorePatterns", self.ignore.to_string()),
            ("ignoreDirectories", self.ignore_directories.to_string()),
            ("server", self.server.display().to_string()),
            ("serverName", self.identity.to_string()),
            ("compilationCommand", self.compile.to_string()),
        ]
    }
}
