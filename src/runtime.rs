//! Process-level wiring shared by the console, C and Python surfaces
//!
//! Opens the serial link when it can. When it cannot, the supervisor is built
//! without hardware and keeps answering `status()`.

use crate::auv::supervisor::{StartOutcome, Status, StopOutcome, Supervisor};
use crate::config::AppConfig;
use crate::error::Result;
use crate::uart::SerialLink;

pub struct Runtime {
    // declared before the link so the run is stopped before the port closes
    supervisor: Supervisor,
    link: Option<SerialLink>,
}

impl Runtime {
    pub fn from_config(config: &AppConfig) -> Self {
        let link = match SerialLink::open(&config.hardware) {
            Ok(link) => Some(link),
            Err(e) => {
                log::warn!("Hardware init failed ({}), running in mock mode", e);
                None
            }
        };
        Self::with_link(config, link)
    }

    /// Supervisor without hardware; `start()` reports `HardwareUnavailable`
    pub fn mock(config: &AppConfig) -> Self {
        Self::with_link(config, None)
    }

    fn with_link(config: &AppConfig, link: Option<SerialLink>) -> Self {
        let hardware = link.as_ref().map(SerialLink::hardware);
        let supervisor =
            Supervisor::new(hardware, config.thresholds, config.program).with_timing(config.timing);
        Self { supervisor, link }
    }

    pub fn port_name(&self) -> Option<&str> {
        self.link.as_ref().map(SerialLink::port_name)
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    pub fn start(&self) -> Result<StartOutcome> {
        self.supervisor.start()
    }

    pub fn stop(&self) -> StopOutcome {
        self.supervisor.stop()
    }

    pub fn status(&self) -> Status {
        self.supervisor.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn unreachable_port() -> AppConfig {
        let mut config = AppConfig::default();
        config.hardware.port = "/dev/auv-supervisor-missing".to_string();
        config
    }

    #[test]
    fn test_missing_port_falls_back_to_mock_mode() {
        let runtime = Runtime::from_config(&unreachable_port());
        assert!(runtime.port_name().is_none());
        assert_eq!(
            runtime.status(),
            Status {
                running: false,
                hardware_available: false
            }
        );
        assert!(matches!(runtime.start(), Err(Error::HardwareUnavailable)));
        assert_eq!(runtime.stop(), StopOutcome::AlreadyStopped);
    }

    #[test]
    fn test_mock_never_touches_serial() {
        let runtime = Runtime::mock(&AppConfig::default());
        assert!(!runtime.supervisor().status().hardware_available);
    }
}
