//! Configuration resolution for the KeyChanger client
//!
//! Provides multi-tier resolution with CLI → ENV → TOML → compiled default
//! priority for every setting.

use kc_common::config::{CompiledDefaults, TomlConfig};
use kc_common::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Environment override for the service base URL
pub const SERVER_URL_ENV: &str = "KEYCHANGER_SERVER_URL";
/// Environment override for the download directory
pub const OUTPUT_DIR_ENV: &str = "KEYCHANGER_OUTPUT_DIR";

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub server_url: Option<String>,
    pub output_dir: Option<PathBuf>,
}

/// Fully resolved client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub analyze_timeout: Duration,
    pub transpose_timeout: Duration,
    pub output_dir: PathBuf,
    pub max_upload_mb: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let defaults = CompiledDefaults::default();
        Self {
            server_url: defaults.server_url,
            analyze_timeout: defaults.analyze_timeout,
            transpose_timeout: defaults.transpose_timeout,
            output_dir: defaults.output_dir,
            max_upload_mb: defaults.max_upload_mb,
        }
    }
}

impl ClientConfig {
    /// Resolve every setting across the four tiers
    pub fn resolve(cli: &CliOverrides, toml_config: &TomlConfig) -> Result<Self> {
        let defaults = CompiledDefaults::default();

        let (server_url, source) = first_set([
            (cli.server_url.clone(), "command line"),
            (std::env::var(SERVER_URL_ENV).ok(), "environment"),
            (toml_config.server_url.clone(), "TOML"),
        ])
        .unwrap_or((defaults.server_url, "default"));
        validate_server_url(&server_url)?;
        info!(server_url = %server_url, source, "Resolved key service URL");

        let output_dir = first_set([
            (cli.output_dir.as_ref().map(|p| p.display().to_string()), "command line"),
            (std::env::var(OUTPUT_DIR_ENV).ok(), "environment"),
            (
                toml_config.output_dir.as_ref().map(|p| p.display().to_string()),
                "TOML",
            ),
        ])
        .map(|(dir, _)| PathBuf::from(dir))
        .unwrap_or(defaults.output_dir);

        let analyze_timeout = timeout_from(toml_config.analyze_timeout_secs, defaults.analyze_timeout)?;
        let transpose_timeout =
            timeout_from(toml_config.transpose_timeout_secs, defaults.transpose_timeout)?;

        Ok(Self {
            server_url,
            analyze_timeout,
            transpose_timeout,
            output_dir,
            max_upload_mb: toml_config.max_upload_mb.unwrap_or(defaults.max_upload_mb),
        })
    }
}

/// First tier holding a non-blank value
fn first_set<const N: usize>(tiers: [(Option<String>, &'static str); N]) -> Option<(String, &'static str)> {
    tiers.into_iter().find_map(|(value, source)| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(|v| (v, source))
    })
}

fn timeout_from(secs: Option<u64>, default: Duration) -> Result<Duration> {
    match secs {
        Some(0) => Err(Error::Config("timeouts must be at least 1 second".to_string())),
        Some(secs) => Ok(Duration::from_secs(secs)),
        None => Ok(default),
    }
}

fn validate_server_url(url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "server URL must start with http:// or https://, got {:?}",
            url
        )))
    }
}
