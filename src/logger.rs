//! Logging utilities with colored, server-prefixed output.
//!
//! This module provides:
//! - `log!` macro for informational lines (green, stdout)
//! - `error!` macro for error and warning lines (red, stderr)
//! - `debug!` macro for diagnostics shown only with `--verbose` (stderr)
//!
//! Every supervisor line carries the `[<server-name>]` prefix. Output of the
//! supervised processes never goes through here; it is forwarded verbatim by
//! [`crate::exec`].
//!
//! # Example
//!
//! ```ignore
//! log!("recompiling and restarting server");
//! error!("server exiting with errors, type 'rs' to restart");
//! debug!("spawning server: {}", path.display());
//! ```

use crossterm::{
    execute,
    terminal::{Clear, ClearType},
};
use owo_colors::{OwoColorize, Stream};
use std::{
    io::{IsTerminal, Write, stderr, stdout},
    sync::OnceLock,
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Name used in the `[name]` prefix of every log line.
static SERVER_NAME: OnceLock<String> = OnceLock::new();

/// Fallback prefix before the server identity is known (config errors).
const DEFAULT_PREFIX: &str = "server-watcher";

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Install the server name used as log prefix. Only the first call wins.
pub fn set_server_name(name: &str) {
    let _ = SERVER_NAME.set(name.to_owned());
}

fn server_name() -> &'static str {
    SERVER_NAME.get().map_or(DEFAULT_PREFIX, String::as_str)
}

// ============================================================================
// Log Macros
// ============================================================================

/// Log an informational line to stdout.
///
/// # Usage
/// ```ignore
/// log!("message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {{
        $crate::logger::info(&format!($($arg)*))
    }};
}

/// Log an error line to stderr.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        $crate::logger::error(&format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::diagnostic(&format!($($arg)*))
        }
    }};
}

// ============================================================================
// Sinks
// ============================================================================

/// Write a green `[name] message` line to stdout.
pub fn info(message: &str) {
    let line = render_info(&format_line(server_name(), message));
    let mut stdout = stdout().lock();
    if stdout.is_terminal() {
        execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    }
    writeln!(stdout, "{line}").ok();
    stdout.flush().ok();
}

/// Write a red `[name] message` line to stderr.
pub fn error(message: &str) {
    let line = render_error(&format_line(server_name(), message));
    let mut stderr = stderr().lock();
    if stderr.is_terminal() {
        execute!(stderr, Clear(ClearType::UntilNewLine)).ok();
    }
    writeln!(stderr, "{line}").ok();
    stderr.flush().ok();
}

/// Color only if stdout supports it or `--color always` was given.
fn render_info(line: &str) -> String {
    line.if_supports_color(Stream::Stdout, |t| t.green())
        .to_string()
}

fn render_error(line: &str) -> String {
    line.if_supports_color(Stream::Stderr, |t| t.red())
        .to_string()
}

/// Write an uncolored diagnostic line to stderr.
pub fn diagnostic(message: &str) {
    let mut stderr = stderr().lock();
    writeln!(stderr, "{message}").ok();
    stderr.flush().ok();
}

#[inline]
fn format_line(name: &str, message: &str) -> String {
    format!("[{name}] {message}")
}

// ============================================================================
// Tests
// ============================================================================
