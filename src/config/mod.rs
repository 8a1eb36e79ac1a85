//! Configuration parsing and validation
//!
//! This module handles parsing of tasks.toml configuration files
//! and validation of the task graph they describe.

pub mod graph;
pub mod parse;
pub mod template;
pub mod types;

// Re-export main types
pub use graph::*;
pub use parse::*;
pub use types::*;
