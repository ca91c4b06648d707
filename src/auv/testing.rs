//! Test doubles: scripted sensors, a recording actuator and a virtual clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::actuator::{Actuator, Motion};
use super::clock::{Clock, SystemClock};
use super::hardware::Hardware;
use super::sensors::{OrientationProvider, RangeSensor};
use super::supervisor::CancelToken;
use super::types::{Axis, Orientation, RangeReading, Sensor, Speed};
use crate::error::{Error, Result};

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Virtual clock; `sleep` advances time instantly. Clones share state.
#[derive(Clone, Default)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualState>>,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    cancel_at: Option<(Duration, CancelToken)>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `token` once virtual time reaches `at`
    pub fn cancel_at(&self, at: Duration, token: CancelToken) {
        lock(&self.inner).cancel_at = Some((at, token));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        lock(&self.inner).now
    }

    fn sleep(&self, duration: Duration) {
        let mut state = lock(&self.inner);
        state.now += duration;
        if let Some((at, token)) = &state.cancel_at {
            if state.now >= *at {
                token.cancel();
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Drive(Motion, Speed),
    Stop,
}

/// Records every successful command with the time it was issued
pub struct RecordingActuator {
    clock: Mutex<Arc<dyn Clock>>,
    log: Mutex<Vec<(Duration, Command)>>,
    fail_after: Mutex<Option<usize>>,
    drive_delay: Mutex<Duration>,
}

impl RecordingActuator {
    fn new() -> Self {
        Self {
            clock: Mutex::new(Arc::new(SystemClock::new()) as Arc<dyn Clock>),
            log: Mutex::new(Vec::new()),
            fail_after: Mutex::new(None),
            drive_delay: Mutex::new(Duration::ZERO),
        }
    }

    pub fn log(&self) -> Vec<(Duration, Command)> {
        lock(&self.log).clone()
    }

    pub fn commands(&self) -> Vec<Command> {
        lock(&self.log).iter().map(|(_, c)| *c).collect()
    }

    pub fn count(&self, cmd: Command) -> usize {
        lock(&self.log).iter().filter(|(_, c)| *c == cmd).count()
    }

    /// Drive commands fail once `n` commands have been recorded. Stop never fails.
    pub fn fail_after(&self, n: usize) {
        *lock(&self.fail_after) = Some(n);
    }

    pub fn heal(&self) {
        *lock(&self.fail_after) = None;
    }

    /// Block inside every drive command for `delay`
    pub fn set_drive_delay(&self, delay: Duration) {
        *lock(&self.drive_delay) = delay;
    }

    fn record(&self, cmd: Command) {
        let at = lock(&self.clock).now();
        lock(&self.log).push((at, cmd));
    }
}

impl Actuator for RecordingActuator {
    fn drive(&self, motion: Motion, speed: Speed) -> Result<()> {
        let delay = *lock(&self.drive_delay);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        if let Some(n) = *lock(&self.fail_after) {
            if lock(&self.log).len() >= n {
                return Err(Error::ActuatorFault("thruster link down".to_string()));
            }
        }
        self.record(Command::Drive(motion, speed));
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.record(Command::Stop);
        Ok(())
    }
}

type RangeScript = Box<dyn Fn(Duration) -> f32 + Send>;

pub struct ScriptedRange {
    axis: Axis,
    clock: Mutex<Arc<dyn Clock>>,
    script: Mutex<RangeScript>,
}

impl RangeSensor for ScriptedRange {
    fn sample(&self) -> Result<RangeReading> {
        let now = lock(&self.clock).now();
        let distance_cm = (*lock(&self.script))(now);
        if distance_cm < 0.0 {
            return Err(Error::sensor_unavailable(Sensor::Range(self.axis), "no echo"));
        }
        Ok(RangeReading { distance_cm, axis: self.axis })
    }
}

pub struct ScriptedOrientation {
    value: Mutex<Orientation>,
    fail: Mutex<bool>,
}

impl OrientationProvider for ScriptedOrientation {
    fn sample(&self) -> Result<Orientation> {
        if *lock(&self.fail) {
            return Err(Error::sensor_unavailable(Sensor::Orientation, "imu silent"));
        }
        Ok(*lock(&self.value))
    }
}

/// Complete scripted vehicle
pub struct Rig {
    pub hardware: Hardware,
    pub actuator: Arc<RecordingActuator>,
    orientation: Arc<ScriptedOrientation>,
    ranges: [Arc<ScriptedRange>; 3],
}

impl Rig {
    /// Level attitude, 100cm clearance everywhere
    pub fn safe() -> Self {
        let actuator = Arc::new(RecordingActuator::new());
        let orientation = Arc::new(ScriptedOrientation {
            value: Mutex::new(Orientation::default()),
            fail: Mutex::new(false),
        });
        let ranges = Axis::ALL.map(|axis| {
            Arc::new(ScriptedRange {
                axis,
                clock: Mutex::new(Arc::new(SystemClock::new()) as Arc<dyn Clock>),
                script: Mutex::new(Box::new(|_: Duration| 100.0_f32) as RangeScript),
            })
        });

        let hardware = Hardware {
            orientation: orientation.clone(),
            front: ranges[0].clone(),
            back: ranges[1].clone(),
            bottom: ranges[2].clone(),
            actuator: actuator.clone(),
        };

        Self {
            hardware,
            actuator,
            orientation,
            ranges,
        }
    }

    /// Timestamp commands and drive range scripts from `clock`
    pub fn attach_clock(&self, clock: &ManualClock) {
        let shared: Arc<dyn Clock> = Arc::new(clock.clone());
        *lock(&self.actuator.clock) = shared.clone();
        for range in &self.ranges {
            *lock(&range.clock) = shared.clone();
        }
    }

    /// Distance in cm as a function of time; negative means sample failure
    pub fn set_range_script<F>(&self, axis: Axis, script: F)
    where
        F: Fn(Duration) -> f32 + Send + 'static,
    {
        let idx = Axis::ALL.iter().position(|a| *a == axis).unwrap_or(0);
        *lock(&self.ranges[idx].script) = Box::new(script);
    }

    pub fn set_orientation(&self, orientation: Orientation) {
        *lock(&self.orientation.value) = orientation;
    }

    pub fn fail_orientation(&self, fail: bool) {
        *lock(&self.orientation.fail) = fail;
    }
}
