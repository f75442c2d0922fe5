//! Bootstrap configuration loading
//!
//! Settings are resolved in this order (highest priority first):
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default
//!
//! This module covers tiers 3 and 4; the client crate layers CLI and
//! environment overrides on top.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Application directory under the platform config dir
const APP_DIR: &str = "keychanger";
const CONFIG_FILE: &str = "config.toml";

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional; unset fields fall through to [`CompiledDefaults`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the key service, e.g. `http://localhost:8000`
    #[serde(default)]
    pub server_url: Option<String>,

    #[serde(default)]
    pub analyze_timeout_secs: Option<u64>,

    #[serde(default)]
    pub transpose_timeout_secs: Option<u64>,

    /// Directory transposed files are saved into
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Upload size limit in megabytes
    #[serde(default)]
    pub max_upload_mb: Option<u64>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Built-in fallbacks used when no other tier supplies a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub server_url: String,
    pub analyze_timeout: Duration,
    pub transpose_timeout: Duration,
    pub output_dir: PathBuf,
    pub max_upload_mb: u64,
    pub log_level: String,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".to_string(),
            analyze_timeout: Duration::from_secs(60),
            // Re-encoding takes longer than analysis
            transpose_timeout: Duration::from_secs(120),
            output_dir: PathBuf::from("."),
            // Matches the service's own upload limit
            max_upload_mb: 50,
            log_level: default_log_level(),
        }
    }
}

/// Platform config file location: `<config_dir>/keychanger/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Load the TOML config.
///
/// With an explicit `path` the file must exist. Without one, the platform
/// default location is tried and a missing file yields an empty config.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path() {
            Some(p) => (p, false),
            None => {
                debug!("No platform config directory; using defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    if !path.exists() {
        if required {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        debug!("No config file at {}; using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|e| {
        warn!("Failed to read config file {}: {}", path.display(), e);
        Error::Io(e)
    })?;
    let config = parse_toml_config(&content).map_err(|e| match e {
        Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
        other => other,
    })?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parse TOML text into a [`TomlConfig`]
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}
