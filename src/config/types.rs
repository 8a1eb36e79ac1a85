//! Core configuration types
//!
//! This module defines the data structures that represent a tasks.toml configuration file.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory searched for fallback scripts when `script_dir` is not set
pub const DEFAULT_SCRIPT_DIR: &str = "scripts";

/// Extension appended to fallback script names
pub const SCRIPT_EXTENSION: &str = "sh";

/// Per-command runtime bound when `timeout` is not set
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Global environment, applied before everything else
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    /// Global dotenv file, relative to the config file's directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dotenv: Option<String>,

    /// Directory holding fallback scripts for tasks without commands
    #[serde(default = "default_script_dir")]
    pub script_dir: String,

    /// Interpreter used to run commands (e.g., ["sh", "-e", "-c"])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<Vec<String>>,

    /// Upper bound on a single command's runtime (e.g., "15s", "2m")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Tasks defined in the configuration, ordered by name
    #[serde(default)]
    pub tasks: BTreeMap<String, Task>,

    /// Directory containing the config file; the base for relative paths
    #[serde(skip)]
    pub base_dir: PathBuf,

    /// Path of the config file this was parsed from
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

/// A task definition
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Task {
    /// Commands to run, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cmds: Vec<String>,

    /// Dependency groups; groups run in order, members of a group run concurrently
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deps: Vec<Vec<String>>,

    /// Working directory, relative to the config file's directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,

    /// Task-local environment
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    /// Task-local dotenv file, relative to the task's working directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dotenv: Option<String>,

    /// Don't inherit the parent process environment
    #[serde(default, skip_serializing_if = "is_false")]
    pub pure: bool,

    /// Longer description for listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_script_dir() -> String {
    DEFAULT_SCRIPT_DIR.to_string()
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Default for Config {
    fn default() -> Self {
        Config {
            env: HashMap::new(),
            dotenv: None,
            script_dir: default_script_dir(),
            interpreter: None,
            timeout: None,
            tasks: BTreeMap::new(),
            base_dir: PathBuf::from("."),
            path: None,
        }
    }
}

impl Config {
    /// Look up a task by name
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// Return a copy of this config where every task runs in a pure environment
    pub fn into_pure(mut self) -> Self {
        self.tasks = self
            .tasks
            .into_iter()
            .map(|(name, task)| (name, Task { pure: true, ..task }))
            .collect();
        self
    }

    /// Working directory for a task; relative dirs are resolved against the base dir
    pub fn working_dir(&self, task: &Task) -> PathBuf {
        match task.dir.as_deref() {
            Some(dir) if !dir.is_empty() => self.base_dir.join(dir),
            _ => self.base_dir.clone(),
        }
    }

    /// Command run for a task that declares no `cmds`
    pub fn script_command(&self, task_name: &str) -> String {
        let script = Path::new(&self.script_dir).join(format!("{}.{}", task_name, SCRIPT_EXTENSION));
        script.display().to_string()
    }

    /// Parsed `timeout`, falling back to the default bound
    pub fn command_timeout(&self) -> ConfigResult<Duration> {
        match self.timeout.as_deref() {
            Some(raw) => parse_timeout(raw),
            None => Ok(DEFAULT_TIMEOUT),
        }
    }
}

/// Parse a human-readable duration such as "15s" or "1m 30s"
pub fn parse_timeout(raw: &str) -> ConfigResult<Duration> {
    humantime::parse_duration(raw.trim())
        .map_err(|e| ConfigError::Invalid(format!("Invalid timeout '{}': {}", raw, e)))
}
