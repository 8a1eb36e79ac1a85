//! Task execution engine
//!
//! This module handles the execution of tasks: environment compilation,
//! the shell boundary, and dependency-group scheduling.

pub mod command;
pub mod context;
pub mod env;
pub mod task;

// Re-export main types
pub use command::*;
pub use context::*;
pub use env::EnvList;
pub use task::*;
