//! Configuration loading: TOML file first, then environment overrides.

use crate::paths::GeoportPaths;
use geoport_core::config::GeoportConfig;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

pub const ENV_SERVICE_URL: &str = "GEOPORT_SERVICE_URL";
pub const ENV_SERVICE_TIMEOUT_SECS: &str = "GEOPORT_SERVICE_TIMEOUT_SECS";
pub const ENV_APP_VERSION: &str = "GEOPORT_APP_VERSION";

/// Errors that can occur while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// File I/O error.
    IoError(std::io::Error),
    /// TOML parsing error.
    ParseError(toml::de::Error),
    /// A value (file or environment) failed validation.
    InvalidValue { key: String, message: String },
    /// Config directory not found.
    ConfigDirNotFound,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "I/O error: {}", e),
            ConfigError::ParseError(e) => write!(f, "TOML parse error: {}", e),
            ConfigError::InvalidValue { key, message } => {
                write!(f, "Invalid value for {}: {}", key, message)
            }
            ConfigError::ConfigDirNotFound => write!(f, "Could not determine config directory"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::ParseError(e)
    }
}

/// Loads [`GeoportConfig`].
///
/// Resolution order, later wins:
/// 1. Built-in defaults
/// 2. `config.toml` (missing or empty file keeps defaults)
/// 3. `GEOPORT_SERVICE_URL`, `GEOPORT_SERVICE_TIMEOUT_SECS`, `GEOPORT_APP_VERSION`
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    /// Loader for the default path (`~/.config/geoport/config.toml`).
    pub fn new() -> Result<Self, ConfigError> {
        let path = GeoportPaths::config_file().map_err(|_| ConfigError::ConfigDirNotFound)?;
        Ok(Self { path })
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file and applies overrides from the process environment.
    pub fn load(&self) -> Result<GeoportConfig, ConfigError> {
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// Loads the file and applies overrides from `lookup`.
    pub fn load_with_env<F>(&self, lookup: F) -> Result<GeoportConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.load_file()?;
        apply_env_overrides(&mut config, lookup)?;
        validate(&config)?;
        Ok(config)
    }

    fn load_file(&self) -> Result<GeoportConfig, ConfigError> {
        if !self.path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", self.path);
            return Ok(GeoportConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(GeoportConfig::default());
        }

        Ok(toml::from_str(&content)?)
    }
}

fn apply_env_overrides<F>(config: &mut GeoportConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_SERVICE_URL).filter(|v| !v.trim().is_empty()) {
        config.service.base_url = url.trim().to_string();
    }

    if let Some(raw) = lookup(ENV_SERVICE_TIMEOUT_SECS) {
        config.service.timeout_secs =
            raw.trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                    key: ENV_SERVICE_TIMEOUT_SECS.to_string(),
                    message: e.to_string(),
                })?;
    }

    if let Some(version) = lookup(ENV_APP_VERSION).filter(|v| !v.trim().is_empty()) {
        config.service.app_version = version.trim().to_string();
    }

    Ok(())
}

fn validate(config: &GeoportConfig) -> Result<(), ConfigError> {
    let raw = &config.service.base_url;
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        key: "service.base_url".to_string(),
        message: format!("'{}' is not a valid URL: {}", raw, e),
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidValue {
            key: "service.base_url".to_string(),
            message: format!("'{}' is not an http(s) URL with a host", raw),
        });
    }
    if config.service.timeout_secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: "service.timeout_secs".to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}
