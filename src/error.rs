//! Error types for tsk

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for tsk operations
pub type Result<T> = std::result::Result<T, TskError>;

/// Main error type for tsk
#[derive(Error, Debug)]
pub enum TskError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task execution errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Task listing serialization errors
    #[error("Failed to render task list: {0}")]
    Render(String),
}

impl TskError {
    /// Whether this error only reports that a sibling failure stopped the work
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TskError::Execution(ExecutionError::Cancelled))
    }
}

/// Configuration parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find tasks.toml (searched: {0})")]
    NotFound(String),

    #[error("Failed to parse '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Task '{0}' is not defined")]
    TaskNotFound(String),

    #[error("Task '{dependency}' (a dependency of '{task}') is not defined")]
    UnknownDependency { task: String, dependency: String },

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("{0} already exists")]
    AlreadyExists(PathBuf),
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command `{command}` failed with exit code {code:?}")]
    CommandFailed { command: String, code: Option<i32> },

    #[error("Command `{command}` timed out after {after:?}")]
    Timeout { command: String, after: Duration },

    #[error("Failed to launch `{command}`: {error}")]
    Launch { command: String, error: io::Error },

    #[error("Failed to load dotenv file '{path}': {error}")]
    DotEnv { path: PathBuf, error: String },

    #[error("Cancelled after a sibling task failed")]
    Cancelled,

    #[error("Interrupted")]
    Interrupted,

    #[error("Task '{0}' panicked")]
    Panicked(String),
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;
