//! Core state shared across the codebase.

mod state;

pub use state::{is_shutdown, register_supervisor, setup_shutdown_handler};
