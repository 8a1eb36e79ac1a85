//! CLI interface and argument parsing
//!
//! This module handles command-line interface parsing, task listings,
//! config scaffolding and shell completion.

pub mod app;
pub mod init;
pub mod list;

// Re-export main types
pub use app::*;
