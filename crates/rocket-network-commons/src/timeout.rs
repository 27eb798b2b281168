//! Timeout configuration for HTTP clients

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connect and read timeouts applied to every request of a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Time allowed to establish a connection
    pub connect_timeout: Duration,
    /// Time allowed for the whole request once connected
    pub read_timeout: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(60),
            read_timeout: Duration::from_secs(60),
        }
    }
}

impl TimeoutConfig {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            read_timeout,
        }
    }

    /// Both timeouts in whole seconds
    pub fn from_secs(connect_secs: u64, read_secs: u64) -> Self {
        Self::new(Duration::from_secs(connect_secs), Duration::from_secs(read_secs))
    }

    /// Validate timeout configuration
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout.is_zero() {
            return Err(Error::Configuration {
                message: "Connect timeout cannot be zero".to_string(),
            });
        }

        if self.read_timeout.is_zero() {
            return Err(Error::Configuration {
                message: "Read timeout cannot be zero".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_config_default() {
        let config = TimeoutConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(60));
        assert_eq!(config.read_timeout, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_config_validation() {
        let mut config = TimeoutConfig::from_secs(0, 10);
        assert!(config.validate().is_err());

        config.connect_timeout = Duration::from_secs(10);
        config.read_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        config.read_timeout = Duration::from_millis(1);
        assert!(config.validate().is_ok());
    }
}
