//! Actor System for the Server Watcher
//!
//! Message-passing concurrency around a single supervisor:
//!
//! ```text
//! FsActor      ──┐
//! (notify)       ├──> SupervisorActor ──> kill / compile / run
//! ConsoleActor ──┘      (lifecycle)
//! (stdin)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher and change filter
//! - `console` - `rs` / `quit` / `exit` commands from stdin
//! - `supervisor` - Lifecycle state machine and its executor
//! - `coordinator` - Wires up and runs actors

pub mod console;
pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod supervisor;

pub use coordinator::Coordinator;
