//! server-watcher - Recompile and restart a development server on file changes.

mod actor;
mod cli;
mod config;
mod core;
mod exec;
mod logger;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::WatcherConfig;

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    };
    // Exit without tearing down the runtime: the console task may be blocked
    // reading stdin.
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = WatcherConfig::load(&cli)?;
    logger::set_verbose(config.verbose);
    logger::set_server_name(config.identity.name());
    config.print_summary();

    // Setup global Ctrl+C handler (before any process is started)
    core::setup_shutdown_handler()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let coordinator = actor::Coordinator::with_config(Arc::new(config));
    let code = runtime.block_on(coordinator.run())?;

    // Leak the runtime instead of dropping it (see `main`).
    std::mem::forget(runtime);
    Ok(code)
}
