//! Application configuration.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Directory under the platform config dir holding `config.toml`.
pub const CONFIG_DIR: &str = "pbtui";
const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "PBTUI";

/// Service URL used when nothing is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
/// Request timeout used when nothing is configured.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

const DEFAULT_CONFIG: &str = r#"# pbtui configuration
#
# Every key can be overridden with an environment variable prefixed with
# PBTUI_, e.g. PBTUI_API_BASE_URL=http://example.com/api

# Base URL of the prediction/result service.
api_base_url = "http://localhost:8080/api"

# Seconds before a service request is abandoned.
request_timeout_secs = 10

# Directory for pbtui.log. Defaults to ./logs when unset.
# log_dir = "/tmp/pbtui"
"#;

/// Runtime settings for the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the prediction/result service.
    pub api_base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Where log files are written.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Load from the default config file (if any) and `PBTUI_*` variables.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) => Self::load_from(path),
            None => Self::build(None),
        }
    }

    /// Load from an explicit file path plus environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::build(Some(path.as_ref()))
    }

    fn build(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("api_base_url", DEFAULT_API_BASE_URL)?
            .set_default("request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS as i64)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("failed to assemble configuration")?;
        let config: AppConfig = settings
            .try_deserialize()
            .context("failed to parse configuration")?;
        Ok(config)
    }

    /// Resolved log directory; falls back to `./logs`.
    pub fn log_dir(&self) -> Result<PathBuf> {
        match &self.log_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()
                .context("failed to determine working directory")?
                .join("logs")),
        }
    }
}

/// Path of the default config file, when the platform has a config dir.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Write a commented default config file unless one already exists.
pub fn ensure_default_config() -> Result<()> {
    match config_path() {
        Some(path) => write_default_config(&path).map(|_| ()),
        None => Ok(()),
    }
}

/// Write the default config to `path`; returns `true` when a file was created.
pub fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_file_round_trips_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join(CONFIG_FILE);

        assert!(write_default_config(&path)?);
        assert!(!write_default_config(&path)?);

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.log_dir, None);
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "api_base_url = \"http://draws.test/api\"\nlog_dir = \"/tmp/pbtui-logs\"\n",
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.api_base_url, "http://draws.test/api");
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.log_dir()?, PathBuf::from("/tmp/pbtui-logs"));
        Ok(())
    }

    #[test]
    fn missing_file_uses_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.api_base_url, AppConfig::default().api_base_url);
        Ok(())
    }
}
