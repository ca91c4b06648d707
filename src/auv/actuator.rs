/**
 * Actuator capability set
 *
 * Directional thrust commands plus an immediate stop. `stop()` may be called
 * from any thread at any time, including while another command is in flight.
 */

use super::thrust_mixer::ThrustCommand;
use super::types::Speed;
use crate::error::Result;

/// Directional motions the vehicle can be commanded into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    Forward,
    Backward,
    Up,
    Down,
    TurnLeft,
    TurnRight,
    PitchUp,
    PitchDown,
}

impl Motion {
    /// Thrust demand for this motion at `speed` percent
    pub fn thrust(self, speed: Speed) -> ThrustCommand {
        let v = speed.percent() as f32;
        let mut cmd = ThrustCommand::default();
        match self {
            Motion::Forward => cmd.surge = v,
            Motion::Backward => cmd.surge = -v,
            Motion::Up => cmd.heave = v,
            Motion::Down => cmd.heave = -v,
            Motion::TurnLeft => cmd.yaw = -v,
            Motion::TurnRight => cmd.yaw = v,
            Motion::PitchUp => cmd.pitch = v,
            Motion::PitchDown => cmd.pitch = -v,
        }
        cmd
    }
}

/// Propulsion interface. Every call either succeeds or fails with
/// `Error::ActuatorFault`.
pub trait Actuator: Send + Sync {
    fn drive(&self, motion: Motion, speed: Speed) -> Result<()>;

    /// Zero net thrust on every axis. Idempotent.
    fn stop(&self) -> Result<()>;

    fn forward(&self, speed: Speed) -> Result<()> {
        self.drive(Motion::Forward, speed)
    }

    fn backward(&self, speed: Speed) -> Result<()> {
        self.drive(Motion::Backward, speed)
    }

    fn up(&self, speed: Speed) -> Result<()> {
        self.drive(Motion::Up, speed)
    }

    fn down(&self, speed: Speed) -> Result<()> {
        self.drive(Motion::Down, speed)
    }

    fn turn_left(&self, speed: Speed) -> Result<()> {
        self.drive(Motion::TurnLeft, speed)
    }

    fn turn_right(&self, speed: Speed) -> Result<()> {
        self.drive(Motion::TurnRight, speed)
    }

    fn pitch_up(&self, speed: Speed) -> Result<()> {
        self.drive(Motion::PitchUp, speed)
    }

    fn pitch_down(&self, speed: Speed) -> Result<()> {
        self.drive(Motion::PitchDown, speed)
    }
}
