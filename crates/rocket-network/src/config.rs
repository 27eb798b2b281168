//! Network configuration
//!
//! Values are resolved from, in increasing precedence:
//! - defaults (60 s timeouts, no body logging)
//! - a JSON configuration file
//! - `ROCKET_NETWORK_*` environment variables

use anyhow::Context;
use rocket_network_commons::{Error, Result, TimeoutConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_BASE_URL: &str = "ROCKET_NETWORK_BASE_URL";
pub const ENV_CONNECT_TIMEOUT: &str = "ROCKET_NETWORK_CONNECT_TIMEOUT";
pub const ENV_READ_TIMEOUT: &str = "ROCKET_NETWORK_READ_TIMEOUT";
pub const ENV_PRINT_LOGS: &str = "ROCKET_NETWORK_PRINT_LOGS";
pub const ENV_LOG_PATH: &str = "ROCKET_NETWORK_LOG_PATH";

/// Default connect timeout in seconds
pub const CONNECT_TIMEOUT: u64 = 60;
/// Default read timeout in seconds
pub const READ_TIMEOUT: u64 = 60;

/// Settings shared by every call made through a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Base URL every request path is resolved against
    pub base_url: String,

    /// Connect timeout in seconds
    pub connect_timeout: u64,

    /// Read timeout in seconds
    pub read_timeout: u64,

    /// Trace request and response bodies
    pub print_logs: bool,

    /// File that receives diagnostic entries, one JSON object per line
    pub log_path: Option<PathBuf>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            connect_timeout: CONNECT_TIMEOUT,
            read_timeout: READ_TIMEOUT,
            print_logs: false,
            log_path: None,
        }
    }
}

impl NetworkConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load from a JSON file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read network config from {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid network config in {}", path.display()))?;
        Ok(config)
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();
        config.merge_from(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override fields with the `ROCKET_NETWORK_*` values `lookup` returns
    pub fn merge_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url;
        }

        if let Some(value) = lookup(ENV_CONNECT_TIMEOUT) {
            self.connect_timeout = value
                .trim()
                .parse()
                .with_context(|| {
                    format!("{} must be a number of seconds, got '{}'", ENV_CONNECT_TIMEOUT, value)
                })?;
        }

        if let Some(value) = lookup(ENV_READ_TIMEOUT) {
            self.read_timeout = value
                .trim()
                .parse()
                .with_context(|| {
                    format!("{} must be a number of seconds, got '{}'", ENV_READ_TIMEOUT, value)
                })?;
        }

        if let Some(value) = lookup(ENV_PRINT_LOGS) {
            self.print_logs = parse_flag(&value)
                .with_context(|| format!("{} must be a boolean, got '{}'", ENV_PRINT_LOGS, value))?;
        }

        if let Some(value) = lookup(ENV_LOG_PATH) {
            self.log_path = if value.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            };
        }

        Ok(())
    }

    pub fn timeouts(&self) -> TimeoutConfig {
        TimeoutConfig::from_secs(self.connect_timeout, self.read_timeout)
    }

    /// Check the base URL and timeouts
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url).map_err(|e| Error::InvalidUrl {
            url: self.base_url.clone(),
            message: e.to_string(),
            source: Some(e),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Configuration {
                message: format!("Unsupported base URL scheme '{}'", url.scheme()),
            });
        }

        self.timeouts().validate()
    }
}

fn parse_flag(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("unrecognized flag value '{}'", other),
    }
}
