//! Configuration loading and log directory resolution
//!
//! Configuration is optional: a missing or unreadable TOML file is not fatal,
//! it logs a warning and falls back to compiled defaults.
//!
//! Log directory resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (`logs`, relative to the working directory)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the log directory
pub const LOG_DIR_ENV_VAR: &str = "SEGAUDIT_LOG_DIR";

/// Compiled default log directory
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";

/// Names of the four fields the validators read from each record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub document_id: String,
    pub record_index: String,
    pub record_count: String,
    pub entity_id: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            document_id: "RP_DOCUMENT_ID".to_string(),
            record_index: "DOCUMENT_RECORD_INDEX".to_string(),
            record_count: "DOCUMENT_RECORD_COUNT".to_string(),
            entity_id: "RP_ENTITY_ID".to_string(),
        }
    }
}

/// Logging section of the TOML config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// TOML config file contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Directory receiving report files
    pub log_directory: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub fields: FieldNames,
}

/// Parse a TOML config file.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load the config from an explicit path or the platform location.
///
/// `Ok(None)` when no explicit path was given and no platform file exists.
/// An explicit path that cannot be read or parsed is an error.
pub fn try_load(explicit: Option<&Path>) -> Result<Option<(PathBuf, TomlConfig)>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Ok(path) => path,
            Err(e) => {
                debug!("No config file: {}", e);
                return Ok(None);
            }
        },
    };

    let config = load_toml_config(&path)?;
    Ok(Some((path, config)))
}

/// Like [`try_load`], but never fails: problems are logged and defaults
/// returned.
pub fn load_or_default(explicit: Option<&Path>) -> TomlConfig {
    match try_load(explicit) {
        Ok(Some((path, config))) => {
            debug!("Loaded config from {}", path.display());
            config
        }
        Ok(None) => TomlConfig::default(),
        Err(e) => {
            warn!("{} (using defaults)", e);
            TomlConfig::default()
        }
    }
}

/// Locate the platform config file
///
/// Linux: `~/.config/segaudit/config.toml`, then `/etc/segaudit/config.toml`.
/// Other platforms: `<config dir>/segaudit/config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("segaudit").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/segaudit/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// Resolve the report directory following the priority order above.
pub fn resolve_log_directory(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config: &TomlConfig,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.log_directory {
        return path.clone();
    }

    // Priority 4: Compiled default
    PathBuf::from(DEFAULT_LOG_DIRECTORY)
}
