//! Environment compilation
//!
//! A compiled environment is a flat list of `KEY=VALUE` strings. Duplicate
//! keys are allowed; when the list is applied to a process the last entry for
//! a key wins. Layers from lowest to highest precedence:
//!
//! 1. the base layer: the full parent environment, or only the identity
//!    variables for a pure task
//! 2. global `env`
//! 3. global `dotenv`
//! 4. task `env`
//! 5. task `dotenv`

use crate::config::{Config, Task};
use crate::error::{ExecutionError, ExecutionResult};
use std::collections::HashMap;
use std::env;
use std::path::Path;

/// Ordered `KEY=VALUE` assignments
pub type EnvList = Vec<String>;

/// Variables a pure task still inherits from the parent process
#[cfg(not(windows))]
pub const IDENTITY_VARS: &[&str] = &["USER", "HOME"];

#[cfg(windows)]
pub const IDENTITY_VARS: &[&str] = &["USERNAME", "USERPROFILE"];

/// Compile the config-level layers: global env, then global dotenv
pub fn compile_global_env(config: &Config) -> ExecutionResult<EnvList> {
    let mut env = to_entries(&config.env);

    if let Some(dotenv) = non_empty(config.dotenv.as_deref()) {
        env.extend(load_dotenv(&config.base_dir.join(dotenv))?);
    }

    Ok(env)
}

/// Compile a task's environment on top of the config-level list
///
/// `inherited` is only read; the result is a new list owned by the caller.
/// The task dotenv is resolved relative to `working_dir`.
pub fn compile_task_env(task: &Task, working_dir: &Path, inherited: &[String]) -> ExecutionResult<EnvList> {
    let mut env = base_env(task.pure);
    env.extend_from_slice(inherited);
    env.extend(to_entries(&task.env));

    if let Some(dotenv) = non_empty(task.dotenv.as_deref()) {
        env.extend(load_dotenv(&working_dir.join(dotenv))?);
    }

    Ok(env)
}

/// The parent environment, or just the identity variables when `pure`
pub fn base_env(pure: bool) -> EnvList {
    if pure {
        IDENTITY_VARS
            .iter()
            .filter_map(|key| env::var(key).ok().map(|value| format!("{}={}", key, value)))
            .collect()
    } else {
        env::vars().map(|(key, value)| format!("{}={}", key, value)).collect()
    }
}

/// Convert a map into entries, sorted by key so output is stable
pub fn to_entries(vars: &HashMap<String, String>) -> EnvList {
    let mut entries: EnvList = vars.iter().map(|(key, value)| format!("{}={}", key, value)).collect();
    entries.sort();
    entries
}

/// Collapse an env list into key/value pairs, last write wins
///
/// Keys keep the position of their first appearance.
pub fn resolve(env: &[String]) -> Vec<(String, String)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut resolved: Vec<(String, String)> = Vec::new();

    for entry in env {
        let Some((key, value)) = entry.split_once('=') else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        match positions.get(key) {
            Some(&i) => resolved[i].1 = value.to_string(),
            None => {
                positions.insert(key, resolved.len());
                resolved.push((key.to_string(), value.to_string()));
            }
        }
    }

    resolved
}

/// Look up the effective value of `key`
pub fn lookup<'e>(env: &'e [String], key: &str) -> Option<&'e str> {
    env.iter().rev().find_map(|entry| match entry.split_once('=') {
        Some((k, v)) if k == key => Some(v),
        _ => None,
    })
}

/// Read a dotenv file into entries, in file order
fn load_dotenv(path: &Path) -> ExecutionResult<EnvList> {
    let to_error = |error: String| ExecutionError::DotEnv {
        path: path.to_path_buf(),
        error,
    };

    let iter = dotenvy::from_path_iter(path).map_err(|e| to_error(e.to_string()))?;

    let mut entries = Vec::new();
    for item in iter {
        let (key, value) = item.map_err(|e| to_error(e.to_string()))?;
        entries.push(format!("{}={}", key, value));
    }
    Ok(entries)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
