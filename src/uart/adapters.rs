//sensor and actuator adapters backed by the STM32 serial link
//
//sensors read the latest frame cached by the link's reader thread and fail
//when it is missing or older than the configured max age

use std::io::Write;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use super::protocol::{OrientationMsg, RangeMsg, ThrusterPwmCmd};
use super::{encode_frame, MsgType, UartFrame};
use crate::auv::actuator::{Actuator, Motion};
use crate::auv::sensors::{OrientationProvider, RangeSensor};
use crate::auv::thrust_mixer::ThrustMixer;
use crate::auv::types::{Axis, Orientation, RangeReading, Sensor, Speed};
use crate::error::{Error, Result};

/// Latest sample per sensor with its arrival time
#[derive(Debug, Clone, Default)]
pub struct SensorCache{
    orientation: Option<(Orientation, Instant)>,
    ranges: [Option<(RangeReading, Instant)>; 3],
}

pub type SharedCache = Arc<RwLock<SensorCache>>;

fn axis_slot(axis: Axis) -> usize{
    axis.as_u8() as usize
}

impl SensorCache{
    /// Record a decoded frame; non-sensor or malformed frames are ignored
    pub fn apply(&mut self, frame: &UartFrame, at: Instant){
        match frame.msg_type{
            MsgType::Orientation => match OrientationMsg::from_bytes(&frame.payload){
                Some(msg) => self.orientation = Some((msg.orientation(), at)),
                None => log::debug!("UART: short orientation payload ({} bytes)", frame.payload.len()),
            },
            MsgType::Range => match RangeMsg::from_bytes(&frame.payload){
                Some(msg) => self.ranges[axis_slot(msg.axis)] = Some((msg.reading(), at)),
                None => log::debug!("UART: bad range payload ({} bytes)", frame.payload.len()),
            },
            MsgType::Thruster => {}
        }
    }

    fn fresh<T: Copy>(entry: &Option<(T, Instant)>, max_age: Duration, sensor: Sensor) -> Result<T>{
        match entry{
            None => Err(Error::sensor_unavailable(sensor, "no sample received")),
            Some((value, at)) =>{
                let age = at.elapsed();
                if age > max_age{
                    Err(Error::sensor_unavailable(sensor, format!("sample is {} ms old", age.as_millis())))
                }else{
                    Ok(*value)
                }
            }
        }
    }
}

fn read_cache(cache: &SharedCache) -> std::sync::RwLockReadGuard<'_, SensorCache>{
    cache.read().unwrap_or_else(|e| e.into_inner())
}

pub struct SerialOrientation{
    cache: SharedCache,
    max_age: Duration,
}

impl SerialOrientation{
    pub fn new(cache: SharedCache, max_age: Duration) -> Self{
        SerialOrientation{ cache, max_age }
    }
}

impl OrientationProvider for SerialOrientation{
    fn sample(&self) -> Result<Orientation>{
        SensorCache::fresh(&read_cache(&self.cache).orientation, self.max_age, Sensor::Orientation)
    }
}

pub struct SerialRange{
    cache: SharedCache,
    axis: Axis,
    max_age: Duration,
}

impl SerialRange{
    pub fn new(cache: SharedCache, axis: Axis, max_age: Duration) -> Self{
        SerialRange{ cache, axis, max_age }
    }
}

impl RangeSensor for SerialRange{
    fn sample(&self) -> Result<RangeReading>{
        let cache = read_cache(&self.cache);
        SensorCache::fresh(&cache.ranges[axis_slot(self.axis)], self.max_age, Sensor::Range(self.axis))
    }
}

pub type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Mixes each capability onto the thrusters and sends one PWM frame
pub struct SerialActuator{
    writer: SharedWriter,
    mixer: ThrustMixer,
}

impl SerialActuator{
    pub fn new(writer: SharedWriter) -> Self{
        SerialActuator{ writer, mixer: ThrustMixer::default() }
    }

    fn send(&self, cmd: &ThrusterPwmCmd) -> Result<()>{
        let frame = encode_frame(MsgType::Thruster, &cmd.to_bytes())?;
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        writer
            .write_all(&frame)
            .and_then(|_| writer.flush())
            .map_err(|e| Error::ActuatorFault(format!("thruster frame write failed: {}", e)))
    }
}

impl Actuator for SerialActuator{
    fn drive(&self, motion: Motion, speed: Speed) -> Result<()>{
        let thrusts = self.mixer.mix(&motion.thrust(speed));
        let cmd = ThrusterPwmCmd::new(ThrustMixer::to_pwm(&thrusts));
        log::debug!("UART: {:?} {}% -> pwm {:?}", motion, speed.percent(), cmd.pwm);
        self.send(&cmd)
    }

    fn stop(&self) -> Result<()>{
        self.send(&ThrusterPwmCmd::neutral())
    }
}
