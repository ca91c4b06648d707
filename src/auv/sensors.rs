/**
 * Sensor interfaces consumed by the supervisor
 *
 * Implementations must return quickly; a failure is reported as
 * `Error::SensorUnavailable` and never retried by the caller.
 */

use super::types::{Orientation, RangeReading};
use crate::error::Result;

/// Source of instantaneous pitch/roll/yaw
pub trait OrientationProvider: Send + Sync {
    fn sample(&self) -> Result<Orientation>;
}

/// Single-axis distance sensor. Readings carry the axis they were taken on.
pub trait RangeSensor: Send + Sync {
    fn sample(&self) -> Result<RangeReading>;
}
