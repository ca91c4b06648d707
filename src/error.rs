//! Error types for the AUV supervisor

use crate::auv::types::Sensor;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Supervisor error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No usable sample (missing, stale or link down). Treated as a hazard.
    #[error("{sensor} sensor unavailable: {reason}")]
    SensorUnavailable { sensor: Sensor, reason: String },

    /// Thrust command could not be delivered; fatal to the current run
    #[error("Actuator fault: {0}")]
    ActuatorFault(String),

    /// Sensor/actuator wiring was never established
    #[error("Hardware unavailable")]
    HardwareUnavailable,

    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration parsed but holds an unusable value
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Malformed frame payload
    #[error("Invalid packet: {0}")]
    InvalidPacket(String),
}

impl Error {
    pub fn sensor_unavailable(sensor: Sensor, reason: impl Into<String>) -> Self {
        Error::SensorUnavailable {
            sensor,
            reason: reason.into(),
        }
    }
}
