//! Operator configuration loaded from `.cluckbook/config.toml`.
//!
//! A missing file means defaults. A file that exists but does not parse is an
//! error.

use crate::core::error::CluckError;
use crate::core::schemas;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output: OutputConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// `text` or `json`
    pub format: String,
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            color: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

/// Load `config.toml` from `config_dir`.
pub fn load_config(config_dir: &Path) -> Result<Config, CluckError> {
    let config_path = config_dir.join(schemas::CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(&config_path).map_err(CluckError::IoError)?;
    let config: Config = toml::from_str(&content)
        .map_err(|e| CluckError::ConfigError(format!("{}: {}", config_path.display(), e)))?;
    match config.output.format.as_str() {
        "text" | "json" => Ok(config),
        other => Err(CluckError::ConfigError(format!(
            "output.format must be 'text' or 'json', got '{}'",
            other
        ))),
    }
}
