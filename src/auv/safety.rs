/**
 * Safety Evaluator
 *
 * Pure function of the latest orientation, the three range readings and the
 * thresholds. A failed or non-finite reading forces its flag true.
 */

use super::sensors::{OrientationProvider, RangeSensor};
use super::types::{Axis, Orientation, RangeReading, SafetyVerdict, Sensor, Thresholds};
use crate::error::{Error, Result};

/// One cycle's worth of raw sensor results
#[derive(Debug)]
pub struct Readings {
    pub orientation: Result<Orientation>,
    pub front: Result<RangeReading>,
    pub back: Result<RangeReading>,
    pub bottom: Result<RangeReading>,
}

impl Readings {
    /// Sample every sensor once. Failures are kept, not propagated.
    pub fn sample(
        orientation: &dyn OrientationProvider,
        front: &dyn RangeSensor,
        back: &dyn RangeSensor,
        bottom: &dyn RangeSensor,
    ) -> Self {
        Self {
            orientation: orientation.sample(),
            front: front.sample(),
            back: back.sample(),
            bottom: bottom.sample(),
        }
    }

    fn errors(&self) -> [(Sensor, Option<&Error>); 4] {
        [
            (Sensor::Orientation, self.orientation.as_ref().err()),
            (Sensor::Range(Axis::Front), self.front.as_ref().err()),
            (Sensor::Range(Axis::Back), self.back.as_ref().err()),
            (Sensor::Range(Axis::Bottom), self.bottom.as_ref().err()),
        ]
    }
}

/// Remembers which sensors were failing so a lost sensor is reported once
/// when it drops out and once when it comes back, not every tick.
#[derive(Debug, Default)]
pub struct SensorWatch {
    failing: [bool; 4],
}

impl SensorWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log failure transitions; returns how many sensors changed state
    pub fn update(&mut self, readings: &Readings) -> usize {
        let mut changed = 0;
        for (was_failing, (sensor, error)) in self.failing.iter_mut().zip(readings.errors()) {
            match (error, *was_failing) {
                (Some(e), false) => log::warn!("Safety: {}", e),
                (None, true) => log::info!("Safety: {} sensor recovered", sensor),
                _ => continue,
            }
            *was_failing = error.is_some();
            changed += 1;
        }
        changed
    }
}

/// Combine readings into a verdict
pub fn evaluate(readings: &Readings, thresholds: &Thresholds) -> SafetyVerdict {
    let tilt_exceeded = match &readings.orientation {
        Ok(o) => !within(o.pitch, thresholds.tilt_degrees) || !within(o.roll, thresholds.tilt_degrees),
        Err(_) => true,
    };

    let obstacle_detected = too_close(&readings.front, thresholds.proximity_cm)
        || too_close(&readings.back, thresholds.proximity_cm);

    let depth_violated = too_close(&readings.bottom, thresholds.min_depth_cm);

    SafetyVerdict {
        tilt_exceeded,
        obstacle_detected,
        depth_violated,
    }
}

//|angle| <= limit, strict on the exceeded side
fn within(angle: f32, limit: f32) -> bool {
    angle.is_finite() && angle.abs() <= limit
}

fn too_close(reading: &Result<RangeReading>, limit_cm: f32) -> bool {
    match reading {
        Ok(r) => !r.distance_cm.is_finite() || r.distance_cm < limit_cm,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(axis: Axis, distance_cm: f32) -> Result<RangeReading> {
        Ok(RangeReading { distance_cm, axis })
    }

    fn lost(axis: Axis) -> Result<RangeReading> {
        Err(Error::sensor_unavailable(Sensor::Range(axis), "no echo"))
    }

    fn level(pitch: f32, roll: f32) -> Result<Orientation> {
        Ok(Orientation { pitch, roll, yaw: 0.0 })
    }

    fn clear() -> Readings {
        Readings {
            orientation: level(0.0, 0.0),
            front: range(Axis::Front, 100.0),
            back: range(Axis::Back, 100.0),
            bottom: range(Axis::Bottom, 100.0),
        }
    }

    #[test]
    fn test_all_clear_is_safe() {
        let verdict = evaluate(&clear(), &Thresholds::default());
        assert!(verdict.is_safe());
    }

    #[test]
    fn test_tilt_boundary_is_strict() {
        let thresholds = Thresholds::default();
        for (pitch, roll) in [(15.0, 0.0), (-15.0, 0.0), (0.0, 15.0), (0.0, -15.0)] {
            let readings = Readings { orientation: level(pitch, roll), ..clear() };
            assert!(!evaluate(&readings, &thresholds).tilt_exceeded);
        }
        for (pitch, roll) in [(15.1, 0.0), (-15.1, 0.0), (0.0, 40.0), (0.0, -90.0)] {
            let readings = Readings { orientation: level(pitch, roll), ..clear() };
            assert!(evaluate(&readings, &thresholds).tilt_exceeded);
        }
    }

    #[test]
    fn test_yaw_ignored() {
        let readings = Readings {
            orientation: Ok(Orientation { pitch: 0.0, roll: 0.0, yaw: 179.0 }),
            ..clear()
        };
        assert!(evaluate(&readings, &Thresholds::default()).is_safe());
    }

    #[test]
    fn test_obstacle_front_or_back() {
        let thresholds = Thresholds::default();

        let readings = Readings { front: range(Axis::Front, 5.0), ..clear() };
        let verdict = evaluate(&readings, &thresholds);
        assert!(verdict.obstacle_detected);
        assert!(!verdict.tilt_exceeded);
        assert!(!verdict.depth_violated);

        let readings = Readings { back: range(Axis::Back, 9.9), ..clear() };
        assert!(evaluate(&readings, &thresholds).obstacle_detected);

        // exactly at the limit is still clear
        let readings = Readings { front: range(Axis::Front, 10.0), ..clear() };
        assert!(!evaluate(&readings, &thresholds).obstacle_detected);
    }

    #[test]
    fn test_depth_violation() {
        let readings = Readings { bottom: range(Axis::Bottom, 3.0), ..clear() };
        let verdict = evaluate(&readings, &Thresholds::default());
        assert!(verdict.depth_violated);
        assert!(!verdict.obstacle_detected);
    }

    #[test]
    fn test_sensor_failure_forces_flag() {
        let thresholds = Thresholds::default();

        let readings = Readings { front: lost(Axis::Front), ..clear() };
        assert!(evaluate(&readings, &thresholds).obstacle_detected);

        let readings = Readings { back: lost(Axis::Back), ..clear() };
        assert!(evaluate(&readings, &thresholds).obstacle_detected);

        let readings = Readings { bottom: lost(Axis::Bottom), ..clear() };
        let verdict = evaluate(&readings, &thresholds);
        assert!(verdict.depth_violated);
        assert!(!verdict.obstacle_detected);

        let readings = Readings {
            orientation: Err(Error::sensor_unavailable(Sensor::Orientation, "i2c timeout")),
            ..clear()
        };
        let verdict = evaluate(&readings, &thresholds);
        assert!(verdict.tilt_exceeded);
        assert!(!verdict.obstacle_detected);
    }

    #[test]
    fn test_non_finite_readings_are_hazards() {
        let thresholds = Thresholds::default();
        let readings = Readings {
            orientation: level(f32::NAN, 0.0),
            bottom: range(Axis::Bottom, f32::NAN),
            ..clear()
        };
        let verdict = evaluate(&readings, &thresholds);
        assert!(verdict.tilt_exceeded);
        assert!(verdict.depth_violated);
    }

    #[test]
    fn test_failures_reported_on_transition_only() {
        let mut watch = SensorWatch::new();
        assert_eq!(watch.update(&clear()), 0);

        let link_down = || Readings {
            orientation: Err(Error::sensor_unavailable(Sensor::Orientation, "stale")),
            front: lost(Axis::Front),
            ..clear()
        };
        assert_eq!(watch.update(&link_down()), 2);
        for _ in 0..10 {
            assert_eq!(watch.update(&link_down()), 0);
        }

        let front_back = Readings { front: range(Axis::Front, 50.0), ..link_down() };
        assert_eq!(watch.update(&front_back), 1);
        assert_eq!(watch.update(&clear()), 1);
        assert_eq!(watch.update(&clear()), 0);
    }
}
