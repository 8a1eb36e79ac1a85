//! tsk - a TOML-based task runner
//!
//! Tasks are named command sequences declared in a `tasks.toml`. A task may
//! depend on ordered groups of other tasks; the members of a group run
//! concurrently and each group finishes before the next starts. Every task
//! gets its own environment, layered from the parent process, the config,
//! dotenv files and the task itself.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod ui;

// Re-export commonly used types
pub use error::{Result, TskError};

/// Current version of tsk
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
