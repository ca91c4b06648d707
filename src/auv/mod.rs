/**
 * AUV Supervisory Control
 *
 * Sense -> evaluate -> actuate, split into:
 * - sensor and actuator interfaces (hardware adapters live in `uart`)
 * - a pure safety evaluator
 * - the patrol motion sequencer
 * - the supervisor owning the start/stop lifecycle
 */

pub mod actuator;
pub mod clock;
pub mod hardware;
pub mod safety;
pub mod sensors;
pub mod sequencer;
pub mod supervisor;
pub mod thrust_mixer;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use actuator::{Actuator, Motion};
pub use clock::{Clock, SystemClock};
pub use hardware::Hardware;
pub use sensors::{OrientationProvider, RangeSensor};
pub use sequencer::{Completion, MotionSequencer};
pub use supervisor::{CancelToken, StartOutcome, Status, StopOutcome, Supervisor};
pub use thrust_mixer::{ThrustCommand, ThrustMixer};
pub use types::{Axis, LapProgram, Orientation, RangeReading, SafetyVerdict, Speed, Thresholds, Timing};
