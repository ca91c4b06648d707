//payload layouts exchanged with the STM32 sensor/thruster board
//all multi-byte fields are little-endian

use crate::auv::thrust_mixer::THRUSTER_COUNT;
use crate::auv::types::{Axis, Orientation, RangeReading};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrientationMsg{
    pub roll: f32,        //degrees
    pub pitch: f32,
    pub yaw: f32,         //0 when the board has no magnetometer fix
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeMsg{
    pub axis: Axis,
    pub distance_cm: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ThrusterPwmCmd{
    pub pwm: [i32; THRUSTER_COUNT],    //µs, 1100-1900, neutral 1500
}

//message sizes
pub const ORIENTATION_MSG_SIZE: usize = 12; //3 * f32
pub const RANGE_MSG_SIZE: usize = 5;        //u8 + f32
pub const THRUSTER_PWM_SIZE: usize = 4 * THRUSTER_COUNT;

fn f32_at(data: &[u8], offset: usize) -> f32{
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&data[offset..offset + 4]);
    f32::from_le_bytes(raw)
}

impl OrientationMsg{
    pub fn from_bytes(data: &[u8]) -> Option<Self>{
        if data.len() < ORIENTATION_MSG_SIZE{
            return None;
        }
        Some(OrientationMsg{
            roll: f32_at(data, 0),
            pitch: f32_at(data, 4),
            yaw: f32_at(data, 8),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8>{
        let mut bytes = Vec::with_capacity(ORIENTATION_MSG_SIZE);
        for v in [self.roll, self.pitch, self.yaw]{
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes
    }

    pub fn orientation(&self) -> Orientation{
        Orientation{ pitch: self.pitch, roll: self.roll, yaw: self.yaw }
    }
}

impl RangeMsg{
    pub fn from_bytes(data: &[u8]) -> Option<Self>{
        if data.len() < RANGE_MSG_SIZE{
            return None;
        }
        let axis = Axis::from_u8(data[0])?;
        Some(RangeMsg{ axis, distance_cm: f32_at(data, 1) })
    }

    pub fn to_bytes(&self) -> Vec<u8>{
        let mut bytes = Vec::with_capacity(RANGE_MSG_SIZE);
        bytes.push(self.axis.as_u8());
        bytes.extend_from_slice(&self.distance_cm.to_le_bytes());
        bytes
    }

    pub fn reading(&self) -> RangeReading{
        RangeReading{ distance_cm: self.distance_cm, axis: self.axis }
    }
}

impl ThrusterPwmCmd{
    pub fn new(pwm_values: [i32; THRUSTER_COUNT]) -> Self{
        ThrusterPwmCmd{ pwm: pwm_values }
    }

    pub fn neutral() -> Self{
        Self::new([crate::auv::thrust_mixer::PWM_NEUTRAL; THRUSTER_COUNT])
    }

    pub fn from_bytes(data: &[u8]) -> Option<Self>{
        if data.len() < THRUSTER_PWM_SIZE{
            return None;
        }
        let mut pwm = [0i32; THRUSTER_COUNT];
        for (i, chunk) in data[..THRUSTER_PWM_SIZE].chunks_exact(4).enumerate(){
            let mut raw = [0u8; 4];
            raw.copy_from_slice(chunk);
            pwm[i] = i32::from_le_bytes(raw);
        }
        Some(ThrusterPwmCmd{ pwm })
    }

    pub fn to_bytes(&self) -> Vec<u8>{
        self.pwm.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
}
