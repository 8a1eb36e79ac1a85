//! Configuration file parsing and discovery

use crate::config::template;
use crate::config::types::Config;
use crate::error::{ConfigError, ConfigResult, TskError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file name to search for
pub const CONFIG_FILE_NAME: &str = "tasks.toml";

/// Find the configuration file by searching current and parent directories
pub fn find_config_file() -> ConfigResult<PathBuf> {
    find_config_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the configuration file starting from a specific directory
pub fn find_config_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        let config_path = current_dir.join(CONFIG_FILE_NAME);
        searched_paths.push(config_path.display().to_string());

        if config_path.is_file() {
            return Ok(config_path);
        }

        // Try parent directory
        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => {
                // Reached root without finding config
                return Err(ConfigError::NotFound(searched_paths.join(", ")));
            }
        }
    }
}

/// Options that shape how a config document is read
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Words passed after `--`, joined by spaces
    pub cli_args: String,

    /// Leave `{{.CLI_ARGS}}` untouched when no args were given
    pub keep_placeholder: bool,
}

/// Parse a configuration file from a path
pub fn parse_config_file(path: &Path, options: &ParseOptions) -> Result<Config, TskError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    let rendered = template::render(&contents, &options.cli_args, options.keep_placeholder);

    let mut config: Config = toml::from_str(&rendered).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    config.base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    config.path = Some(path.to_path_buf());

    Ok(config)
}

/// Parse configuration from a string, using `base_dir` for relative paths
pub fn parse_config(contents: &str, base_dir: &Path) -> Result<Config, TskError> {
    let mut config: Config = toml::from_str(contents)?;
    config.base_dir = base_dir.to_path_buf();
    Ok(config)
}

/// Parse configuration with automatic file discovery
pub fn parse_config_auto(options: &ParseOptions) -> Result<Config, TskError> {
    let config_path = find_config_file()?;
    parse_config_file(&config_path, options)
}
