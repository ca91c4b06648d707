/**
 * Supervisor
 *
 * Owns the run state and the single background execution unit running the
 * motion sequencer. `start`/`stop`/`status` are serialized through one mutex,
 * so two concurrent starts can never launch two sequencers.
 *
 * Cancellation is cooperative. Worst-case latency between `stop()` and
 * actuator quiescence is one tick plus one actuator call; `stop()` waits at
 * most `Timing::stop_timeout` for the unit and then stops the thrusters
 * regardless.
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use super::clock::{Clock, SystemClock};
use super::hardware::Hardware;
use super::sequencer::{Completion, MotionSequencer};
use super::types::{LapProgram, Thresholds, Timing};
use crate::error::{Error, Result};

/// Cooperative cancellation signal polled by the sequencer
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    AlreadyStopped,
}

/// Snapshot returned to the control surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status {
    /// True while a run is active or stopping
    pub running: bool,
    pub hardware_available: bool,
}

struct ActiveRun {
    id: u64,
    cancel: CancelToken,
    done: mpsc::Receiver<()>,
    handle: JoinHandle<()>,
}

enum RunState {
    Idle,
    Running(ActiveRun),
    /// A `stop()` call owns the run and is waiting for it
    Stopping,
}

struct Lifecycle {
    state: RunState,
    next_id: u64,
}

type SharedLifecycle = Arc<Mutex<Lifecycle>>;

fn lock(lifecycle: &SharedLifecycle) -> MutexGuard<'_, Lifecycle> {
    lifecycle.lock().unwrap_or_else(|e| e.into_inner())
}

pub struct Supervisor {
    hardware: Option<Hardware>,
    clock: Arc<dyn Clock>,
    thresholds: Thresholds,
    program: LapProgram,
    timing: Timing,
    lifecycle: SharedLifecycle,
}

impl Supervisor {
    /// `hardware` is `None` when the sensor/actuator wiring failed; such a
    /// supervisor reports status but refuses to start.
    pub fn new(hardware: Option<Hardware>, thresholds: Thresholds, program: LapProgram) -> Self {
        Self {
            hardware,
            clock: Arc::new(SystemClock::new()),
            thresholds,
            program,
            timing: Timing::default(),
            lifecycle: Arc::new(Mutex::new(Lifecycle {
                state: RunState::Idle,
                next_id: 0,
            })),
        }
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn status(&self) -> Status {
        let lifecycle = lock(&self.lifecycle);
        Status {
            running: !matches!(lifecycle.state, RunState::Idle),
            hardware_available: self.hardware.is_some(),
        }
    }

    /// Launch a patrol in the background. Never blocks on the patrol itself.
    pub fn start(&self) -> Result<StartOutcome> {
        let mut lifecycle = lock(&self.lifecycle);
        if !matches!(lifecycle.state, RunState::Idle) {
            log::info!("Supervisor: start ignored, already running");
            return Ok(StartOutcome::AlreadyRunning);
        }

        let hardware = match &self.hardware {
            Some(hw) => hw.clone(),
            None => {
                log::error!("Supervisor: cannot start, hardware not initialized");
                return Err(Error::HardwareUnavailable);
            }
        };

        lifecycle.next_id += 1;
        let id = lifecycle.next_id;
        let cancel = CancelToken::new();
        let (done_tx, done_rx) = mpsc::channel();

        let unit = ExecutionUnit {
            id,
            hardware,
            clock: Arc::clone(&self.clock),
            thresholds: self.thresholds,
            program: self.program,
            timing: self.timing,
            cancel: cancel.clone(),
        };
        let lifecycle_ref = Arc::clone(&self.lifecycle);
        let handle = thread::Builder::new()
            .name("auv-sequencer".to_string())
            .spawn(move || unit.run(lifecycle_ref, done_tx))?;

        lifecycle.state = RunState::Running(ActiveRun {
            id,
            cancel,
            done: done_rx,
            handle,
        });
        log::info!("Supervisor: run {} started", id);
        Ok(StartOutcome::Started)
    }

    /// Cancel the active run, wait for it (bounded), then stop the thrusters.
    ///
    /// Returns `AlreadyStopped` when idle, and also when another `stop()` is
    /// still waiting on the run. In that case `status().running` stays true
    /// until the first caller finishes.
    pub fn stop(&self) -> StopOutcome {
        let run = {
            let mut lifecycle = lock(&self.lifecycle);
            match std::mem::replace(&mut lifecycle.state, RunState::Stopping) {
                RunState::Running(run) => run,
                other => {
                    lifecycle.state = other;
                    return StopOutcome::AlreadyStopped;
                }
            }
        };

        log::info!("Supervisor: stopping run {}", run.id);
        run.cancel.cancel();

        let timeout = self.timing.stop_timeout();
        match run.done.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if run.handle.join().is_err() {
                    log::error!("Supervisor: run {} panicked", run.id);
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                // the unit stops the thrusters itself whenever it does exit
                log::warn!(
                    "Supervisor: run {} did not terminate within {:?}",
                    run.id,
                    timeout
                );
            }
        }

        if let Some(hw) = &self.hardware {
            if let Err(e) = hw.actuator.stop() {
                log::error!("Supervisor: actuator stop failed: {}", e);
            }
        }

        lock(&self.lifecycle).state = RunState::Idle;
        log::info!("Supervisor: stopped");
        StopOutcome::Stopped
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Everything one background run needs, moved onto its thread
struct ExecutionUnit {
    id: u64,
    hardware: Hardware,
    clock: Arc<dyn Clock>,
    thresholds: Thresholds,
    program: LapProgram,
    timing: Timing,
    cancel: CancelToken,
}

impl ExecutionUnit {
    fn run(self, lifecycle: SharedLifecycle, done: mpsc::Sender<()>) {
        let mut guard = ExitGuard {
            id: self.id,
            hardware: &self.hardware,
            lifecycle,
            done: Some(done),
            needs_stop: true,
        };

        let sequencer = MotionSequencer::new(
            &self.hardware,
            self.clock.as_ref(),
            self.thresholds,
            self.program,
            self.timing,
        );

        match sequencer.run(&self.cancel) {
            Ok(Completion::Finished) => {
                log::info!("Supervisor: run {} finished patrol", self.id);
                guard.needs_stop = false;
            }
            Ok(Completion::Cancelled) => {
                log::info!("Supervisor: run {} cancelled", self.id);
            }
            Err(e) => {
                log::error!("Supervisor: run {} aborted: {}", self.id, e);
            }
        }
    }
}

/// Runs on every exit path of the unit, panics included: stops the
/// thrusters unless the program ended cleanly, releases the run state if no
/// `stop()` call owns it, then signals completion.
struct ExitGuard<'a> {
    id: u64,
    hardware: &'a Hardware,
    lifecycle: SharedLifecycle,
    done: Option<mpsc::Sender<()>>,
    needs_stop: bool,
}

impl Drop for ExitGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            log::error!("Supervisor: run {} panicked", self.id);
        }
        if self.needs_stop {
            if let Err(e) = self.hardware.actuator.stop() {
                log::error!("Supervisor: run {} could not stop thrusters: {}", self.id, e);
            }
        }

        {
            let mut lifecycle = lock(&self.lifecycle);
            let owns_state = matches!(&lifecycle.state, RunState::Running(run) if run.id == self.id);
            if owns_state {
                lifecycle.state = RunState::Idle;
            }
        }

        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
    }
}
