//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Watch a source tree, recompile and restart a development server on change
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Semicolon-separated list of patterns to watch [default: **/*]
    #[arg(short, long, value_delimiter = ';', value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// Semicolon-separated list of patterns to ignore
    #[arg(short, long, value_delimiter = ';', value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Ignore directory updates
    #[arg(short = 'd', long)]
    pub ignore_directories: bool,

    /// Output extra data to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Server executable to run, kill and restart
    #[arg(short, long, value_hint = clap::ValueHint::ExecutablePath)]
    pub server: Option<PathBuf>,

    /// Command to recompile the server (split on whitespace)
    #[arg(short, long, value_name = "COMMAND")]
    pub compilation_command: Option<String>,

    /// Config file path (default: server-watcher.toml)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}
