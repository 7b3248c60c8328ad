//! Configuration file loading
//!
//! Parser settings live in the `[parser]` table of a TOML file, looked up as
//! `--config <path>`, then `$TIMETABLE_CONFIG`, then `<home>/config.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use timetable_core::ParserConfig;

pub const CONFIG_ENV: &str = "TIMETABLE_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config not found at: {0}")]
    NotFound(String),

    #[error("{0}")]
    Invalid(#[from] timetable_core::ParseError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
struct RootConfig {
    #[serde(default)]
    parser: Option<ParserConfig>,
}

/// Parse and validate a config file's contents.
pub fn parse_config(content: &str) -> Result<ParserConfig> {
    let root: RootConfig = toml::from_str(content)?;
    let config = root.parser.unwrap_or_default();
    config.validate()?;
    Ok(config)
}

/// Load from an explicit path. A missing file is an error.
pub fn load_config(path: &Path) -> Result<ParserConfig> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }
    parse_config(&std::fs::read_to_string(path)?)
}

/// Where the config comes from, if anywhere.
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    timetable_logging::timetable_home()
        .ok()
        .map(|home| home.join("config.toml"))
        .filter(|path| path.exists())
}

/// Resolve and load the effective parser configuration.
pub fn resolve(explicit: Option<&Path>) -> Result<(ParserConfig, Option<PathBuf>)> {
    match config_path(explicit) {
        Some(path) => Ok((load_config(&path)?, Some(path))),
        None => Ok((ParserConfig::default(), None)),
    }
}
