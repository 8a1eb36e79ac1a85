//! Scaffolding for a new tasks.toml

use crate::config::CONFIG_FILE_NAME;
use crate::error::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of a freshly scaffolded config
pub const TEMPLATE: &str = r#"[tasks.hello]
cmds = ["echo hello!"]
"#;

/// Write a starter tasks.toml into `dir`, refusing to overwrite one
pub fn init_config_file(dir: &Path) -> anyhow::Result<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path).into());
    }

    fs::write(&path, TEMPLATE)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
    Ok(path)
}
