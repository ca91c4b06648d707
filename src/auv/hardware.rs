/**
 * Hardware wiring
 *
 * The set of sensor and actuator adapters a run needs. The supervisor either
 * has all of them or none.
 */

use std::sync::Arc;

use super::actuator::Actuator;
use super::safety::Readings;
use super::sensors::{OrientationProvider, RangeSensor};

#[derive(Clone)]
pub struct Hardware {
    pub orientation: Arc<dyn OrientationProvider>,
    pub front: Arc<dyn RangeSensor>,
    pub back: Arc<dyn RangeSensor>,
    pub bottom: Arc<dyn RangeSensor>,
    pub actuator: Arc<dyn Actuator>,
}

impl Hardware {
    /// Sample all four sensors once
    pub fn sample(&self) -> Readings {
        Readings::sample(
            self.orientation.as_ref(),
            self.front.as_ref(),
            self.back.as_ref(),
            self.bottom.as_ref(),
        )
    }
}
