/**
 * Motion Sequencer
 *
 * Runs the patrol program: submerge, `lap_count` forward laps guarded by the
 * safety interlocks, surface. A repeating program pauses for
 * `Timing::cycle_pause` and patrols again until cancelled. Driven
 * synchronously by the caller's thread; the cancellation token is polled at
 * least once per tick.
 *
 * Hazard time counts against the lap: a lap always ends after
 * `lap_duration` of program time, whether the vehicle moved or not.
 */

use std::time::Duration;

use super::actuator::Motion;
use super::clock::Clock;
use super::hardware::Hardware;
use super::safety::{self, SensorWatch};
use super::supervisor::CancelToken;
use super::types::{LapProgram, Speed, Thresholds, Timing};
use crate::error::Result;

/// How a program execution ended without a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Surfaced after the last lap of a non-repeating program
    Finished,
    /// Cancellation observed; actuator state is left to the caller
    Cancelled,
}

/// Program phase, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Submerge,
    Lap(u32),
    Surface,
}

pub struct MotionSequencer<'a> {
    hardware: &'a Hardware,
    clock: &'a dyn Clock,
    thresholds: Thresholds,
    program: LapProgram,
    timing: Timing,
}

impl<'a> MotionSequencer<'a> {
    pub fn new(
        hardware: &'a Hardware,
        clock: &'a dyn Clock,
        thresholds: Thresholds,
        program: LapProgram,
        timing: Timing,
    ) -> Self {
        Self {
            hardware,
            clock,
            thresholds,
            program,
            timing,
        }
    }

    /// Execute the program. Any actuator error aborts immediately.
    pub fn run(&self, cancel: &CancelToken) -> Result<Completion> {
        let mut watch = SensorWatch::new();
        let mut cycle = 1u64;
        loop {
            if self.patrol(cycle, &mut watch, cancel)? == Completion::Cancelled {
                return Ok(Completion::Cancelled);
            }
            if !self.program.repeat {
                return Ok(Completion::Finished);
            }
            let pause = self.timing.cycle_pause().max(self.timing.tick());
            if self.wait(pause, cancel) == Completion::Cancelled {
                return Ok(Completion::Cancelled);
            }
            cycle += 1;
        }
    }

    fn patrol(&self, cycle: u64, watch: &mut SensorWatch, cancel: &CancelToken) -> Result<Completion> {
        let speed = self.program.cruise_speed();
        log::info!(
            "Sequencer: patrol {} start - {} lap(s) of {:.1}s at {}%",
            cycle,
            self.program.lap_count,
            self.program.lap_duration_seconds,
            speed.percent()
        );

        let submerge = self.program.submerge_duration();
        if self.hold(Phase::Submerge, Motion::Down, speed, submerge, cancel)? == Completion::Cancelled {
            return Ok(Completion::Cancelled);
        }

        for lap in 1..=self.program.lap_count {
            if self.run_lap(lap, speed, watch, cancel)? == Completion::Cancelled {
                return Ok(Completion::Cancelled);
            }
        }

        let surface = self.program.surface_duration();
        if self.hold(Phase::Surface, Motion::Up, speed, surface, cancel)? == Completion::Cancelled {
            return Ok(Completion::Cancelled);
        }

        log::info!("Sequencer: patrol {} complete", cycle);
        Ok(Completion::Finished)
    }

    //command `motion`, wait `duration`, stop
    fn hold(
        &self,
        phase: Phase,
        motion: Motion,
        speed: Speed,
        duration: Duration,
        cancel: &CancelToken,
    ) -> Result<Completion> {
        log::info!("Sequencer: {:?} - {:?} {}% for {:.1}s", phase, motion, speed.percent(), duration.as_secs_f64());
        self.hardware.actuator.drive(motion, speed)?;
        if self.wait(duration, cancel) == Completion::Cancelled {
            return Ok(Completion::Cancelled);
        }
        self.hardware.actuator.stop()?;
        Ok(Completion::Finished)
    }

    fn run_lap(&self, lap: u32, speed: Speed, watch: &mut SensorWatch, cancel: &CancelToken) -> Result<Completion> {
        let phase = Phase::Lap(lap);
        let lap_duration = self.program.lap_duration();
        let start = self.clock.now();
        let mut hazard_active = false;

        log::info!("Sequencer: {:?} of {}", phase, self.program.lap_count);

        loop {
            if cancel.is_cancelled() {
                return Ok(Completion::Cancelled);
            }

            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed >= lap_duration {
                break;
            }
            let remaining = lap_duration - elapsed;

            let readings = self.hardware.sample();
            watch.update(&readings);
            let verdict = safety::evaluate(&readings, &self.thresholds);
            let pause = if verdict.is_safe() {
                if hazard_active {
                    log::info!("Sequencer: {:?} - hazard cleared, resuming", phase);
                    hazard_active = false;
                }
                self.hardware.actuator.forward(speed)?;
                self.timing.tick()
            } else {
                if !hazard_active {
                    log::warn!("Sequencer: {:?} - interlock {:?}, holding position", phase, verdict);
                    hazard_active = true;
                }
                self.hardware.actuator.stop()?;
                self.timing.hazard_idle().max(self.timing.tick())
            };

            if self.wait(pause.min(remaining), cancel) == Completion::Cancelled {
                return Ok(Completion::Cancelled);
            }
        }

        self.hardware.actuator.stop()?;
        Ok(Completion::Finished)
    }

    //sleep in tick-sized slices so cancellation is seen within one tick
    fn wait(&self, duration: Duration, cancel: &CancelToken) -> Completion {
        let deadline = self.clock.now().saturating_add(duration);
        let tick = self.timing.tick();
        loop {
            if cancel.is_cancelled() {
                return Completion::Cancelled;
            }
            let now = self.clock.now();
            if now >= deadline {
                return Completion::Finished;
            }
            self.clock.sleep((deadline - now).min(tick));
        }
    }
}
