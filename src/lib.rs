pub mod auv;
pub mod config;
pub mod error;
pub mod ffi;
pub mod runtime;
pub mod uart;

#[cfg(feature = "python")]
pub mod python;

pub use auv::{
    Actuator, Axis, LapProgram, Motion, Orientation, OrientationProvider, RangeReading,
    RangeSensor, SafetyVerdict, Speed, Thresholds, Timing,
    Hardware, StartOutcome, Status, StopOutcome, Supervisor,
};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use runtime::Runtime;
pub use uart::SerialLink;
