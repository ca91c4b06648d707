//! Configuration for the AUV supervisor
//!
//! Loaded from a TOML file. Every section is optional and falls back to the
//! vehicle's stock values.

use crate::auv::types::{LapProgram, Thresholds, Timing};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub hardware: HardwareConfig,
    pub thresholds: Thresholds,
    pub program: LapProgram,
    pub timing: Timing,
    pub logging: LoggingConfig,
}

/// STM32 serial link
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// Serial device of the sensor/thruster board
    pub port: String,
    pub baud_rate: u32,
    /// Samples older than this are reported as unavailable
    pub sample_timeout_ms: u64,
}

impl HardwareConfig {
    pub fn sample_timeout(&self) -> Duration {
        Duration::from_millis(self.sample_timeout_ms)
    }
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyACM0".to_string(),
            baud_rate: 9600,
            sample_timeout_ms: 500,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    ///
    /// # Example
    /// ```no_run
    /// use auv_supervisor::config::AppConfig;
    ///
    /// let config = AppConfig::load("auv.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values a run could not represent
    pub fn validate(&self) -> Result<()> {
        if let Some(field) = self.program.invalid_duration() {
            return Err(Error::InvalidConfig(format!(
                "program.{} must be a finite number of seconds",
                field
            )));
        }
        Ok(())
    }
}
