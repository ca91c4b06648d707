/**
 * Thrust Mixer
 *
 * Converts a 4-DoF thrust demand (surge, heave, pitch, yaw) into individual
 * thruster values for the two horizontal and two vertical propellers.
 */

pub const THRUSTER_COUNT: usize = 4;

pub const PWM_NEUTRAL: i32 = 1500;

/// Thrust command for the controllable degrees of freedom
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThrustCommand {
    pub surge: f32,
    pub heave: f32,
    pub pitch: f32,
    pub yaw: f32,
}

/// Thrust mixer configuration
#[derive(Debug, Clone)]
pub struct ThrustMixer {
    /// Contribution of each DoF to each thruster [4 thrusters x 4 DoFs]
    pub mix_matrix: [[f32; 4]; THRUSTER_COUNT],
    /// Maximum thrust per thruster
    pub max_thrust: f32,
}

impl Default for ThrustMixer {
    fn default() -> Self {
        // Rows: thrusters, Columns: [surge, heave, pitch, yaw]
        Self {
            mix_matrix: [
                // Thruster 0 (left horizontal)
                [1.0, 0.0, 0.0, 1.0],
                // Thruster 1 (right horizontal)
                [1.0, 0.0, 0.0, -1.0],
                // Thruster 2 (front vertical)
                [0.0, 1.0, 1.0, 0.0],
                // Thruster 3 (rear vertical)
                [0.0, 1.0, -1.0, 0.0],
            ],
            max_thrust: 100.0,
        }
    }
}

impl ThrustMixer {
    /// Mix a DoF command into individual thruster values
    pub fn mix(&self, cmd: &ThrustCommand) -> [f32; THRUSTER_COUNT] {
        let dof = [cmd.surge, cmd.heave, cmd.pitch, cmd.yaw];
        let mut output = [0.0f32; THRUSTER_COUNT];

        for (out, row) in output.iter_mut().zip(self.mix_matrix.iter()) {
            let sum: f32 = row.iter().zip(dof.iter()).map(|(c, d)| c * d).sum();
            *out = sum.clamp(-self.max_thrust, self.max_thrust);
        }

        output
    }

    /// Convert thrust values (-100 to 100) to PWM (1100 to 1900)
    pub fn thrust_to_pwm(thrust: f32) -> i32 {
        (PWM_NEUTRAL as f32 + thrust.clamp(-100.0, 100.0) * 4.0) as i32
    }

    pub fn to_pwm(thrusts: &[f32; THRUSTER_COUNT]) -> [i32; THRUSTER_COUNT] {
        thrusts.map(Self::thrust_to_pwm)
    }
}
