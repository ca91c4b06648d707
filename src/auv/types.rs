/**
 * Core value types
 *
 * Snapshots produced once per sample, configuration that is fixed for the
 * lifetime of a run, and the per-tick safety verdict.
 */

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Orientation snapshot in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    pub pitch: f32,
    pub roll: f32,
    /// 0.0 when not integrated; never used for safety
    pub yaw: f32,
}

/// Sensing axis of a range sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Front,
    Back,
    Bottom,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Front, Axis::Back, Axis::Bottom];

    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            0 => Some(Axis::Front),
            1 => Some(Axis::Back),
            2 => Some(Axis::Bottom),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Axis::Front => 0,
            Axis::Back => 1,
            Axis::Bottom => 2,
        }
    }
}

/// Single range measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeReading {
    pub distance_cm: f32,
    pub axis: Axis,
}

/// Identifies a sensor in error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    Orientation,
    Range(Axis),
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sensor::Orientation => write!(f, "orientation"),
            Sensor::Range(axis) => write!(f, "{:?} range", axis),
        }
    }
}

/// Safety thresholds, fixed for the lifetime of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Max |pitch| or |roll| before the tilt interlock trips
    pub tilt_degrees: f32,
    /// Min front/back clearance
    pub proximity_cm: f32,
    /// Min clearance to the bottom
    pub min_depth_cm: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            tilt_degrees: 15.0,
            proximity_cm: 10.0,
            min_depth_cm: 10.0,
        }
    }
}

/// Patrol program: submerge, `lap_count` forward laps, surface.
/// With `repeat` set the program runs again after `Timing::cycle_pause`
/// until the run is stopped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LapProgram {
    pub lap_duration_seconds: f64,
    pub lap_count: u32,
    pub submerge_seconds: f64,
    pub surface_seconds: f64,
    /// Clamped to 0..=100 before dispatch
    pub cruise_speed_percent: i32,
    pub repeat: bool,
}

impl LapProgram {
    pub fn lap_duration(&self) -> Duration {
        secs(self.lap_duration_seconds)
    }

    pub fn submerge_duration(&self) -> Duration {
        secs(self.submerge_seconds)
    }

    pub fn surface_duration(&self) -> Duration {
        secs(self.surface_seconds)
    }

    pub fn cruise_speed(&self) -> Speed {
        Speed::clamped(self.cruise_speed_percent as i64)
    }

    /// Name of the first duration that is not a finite, representable
    /// number of seconds
    pub fn invalid_duration(&self) -> Option<&'static str> {
        [
            ("lap_duration_seconds", self.lap_duration_seconds),
            ("submerge_seconds", self.submerge_seconds),
            ("surface_seconds", self.surface_seconds),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite() || Duration::try_from_secs_f64(v.max(0.0)).is_err())
        .map(|(name, _)| name)
    }
}

impl Default for LapProgram {
    fn default() -> Self {
        Self {
            lap_duration_seconds: 30.0,
            lap_count: 2,
            submerge_seconds: 5.0,
            surface_seconds: 5.0,
            cruise_speed_percent: 70,
            repeat: false,
        }
    }
}

//negative or NaN durations collapse to zero, oversized ones saturate
fn secs(value: f64) -> Duration {
    if value > 0.0 {
        Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

/// Control-loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Interval between safety re-evaluations during a lap
    pub tick_ms: u64,
    /// Wait after a hazard stop before the next evaluation
    pub hazard_idle_ms: u64,
    /// Bounded wait for the execution unit on stop
    pub stop_timeout_ms: u64,
    /// Pause between patrols of a repeating program
    pub cycle_pause_ms: u64,
}

impl Timing {
    /// Never zero, so waits always make progress
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn hazard_idle(&self) -> Duration {
        Duration::from_millis(self.hazard_idle_ms)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    pub fn cycle_pause(&self) -> Duration {
        Duration::from_millis(self.cycle_pause_ms)
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            hazard_idle_ms: 1000,
            stop_timeout_ms: 5000,
            cycle_pause_ms: 1000,
        }
    }
}

/// Thrust percentage, always within 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Speed(u8);

impl Speed {
    pub const MAX: Speed = Speed(100);

    pub fn clamped(percent: i64) -> Self {
        Speed(percent.clamp(0, 100) as u8)
    }

    pub fn percent(self) -> u8 {
        self.0
    }
}

/// Per-tick hazard flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SafetyVerdict {
    pub tilt_exceeded: bool,
    pub obstacle_detected: bool,
    pub depth_violated: bool,
}

impl SafetyVerdict {
    pub fn is_safe(&self) -> bool {
        !(self.tilt_exceeded || self.obstacle_detected || self.depth_violated)
    }
}
