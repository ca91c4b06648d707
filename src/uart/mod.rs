pub mod adapters;
pub mod link;
pub mod protocol;

pub use adapters::{SerialActuator, SerialOrientation, SerialRange, SensorCache};
pub use link::SerialLink;
pub use protocol::*;

use crate::error::{Error, Result};

pub const SYNC_BYTE: u8 = 0xAA;
pub const MAX_MSG_SIZE: usize = 244;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MsgType{
    Thruster = 0x03,
    Orientation = 0x05,
    Range = 0x06,
}

impl MsgType{
    fn from_u8(val: u8) -> Option<Self>{
        match val{
            0x03 => Some(MsgType::Thruster),
            0x05 => Some(MsgType::Orientation),
            0x06 => Some(MsgType::Range),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UartFrame{
    pub msg_type: MsgType,
    pub payload: Vec<u8>,
}

pub fn calculate_checksum(data: &[u8]) -> u8{
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

//frame format: [SYNC][TYPE][LEN][PAYLOAD...][CHECKSUM]
//              0xAA  1byte 1byte  LEN bytes   1byte
pub fn encode_frame(msg_type: MsgType, payload: &[u8]) -> Result<Vec<u8>>{
    if payload.len() > MAX_MSG_SIZE{
        return Err(Error::InvalidPacket(format!(
            "payload of {} bytes exceeds {}", payload.len(), MAX_MSG_SIZE
        )));
    }

    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.push(SYNC_BYTE);
    frame.push(msg_type as u8);
    frame.push(payload.len() as u8);
    frame.extend_from_slice(payload);

    let checksum = calculate_checksum(&frame[1..]);
    frame.push(checksum);
    Ok(frame)
}

/// Incremental frame parser over a byte stream with resync on garbage
#[derive(Debug, Default)]
pub struct FrameDecoder{
    rx_buffer: Vec<u8>,
}

impl FrameDecoder{
    pub fn new() -> Self{
        FrameDecoder{ rx_buffer: Vec::with_capacity(512) }
    }

    pub fn push(&mut self, data: &[u8]){
        self.rx_buffer.extend_from_slice(data);
    }

    /// Next complete, checksummed frame of a known type
    pub fn next_frame(&mut self) -> Option<UartFrame>{
        loop{
            if self.rx_buffer.len() < 4{
                return None;
            }

            //find sync byte
            let sync_pos = match self.rx_buffer.iter().position(|&b| b == SYNC_BYTE){
                Some(pos) => pos,
                None =>{
                    self.rx_buffer.clear();
                    return None;
                }
            };
            if sync_pos > 0{
                self.rx_buffer.drain(0..sync_pos);
            }

            if self.rx_buffer.len() < 4{
                return None;
            }

            let msg_type_byte = self.rx_buffer[1];
            let len = self.rx_buffer[2] as usize;

            if len > MAX_MSG_SIZE{
                self.rx_buffer.remove(0);
                continue;
            }

            let frame_len = 4 + len; //sync + type + len + payload + checksum
            if self.rx_buffer.len() < frame_len{
                return None;
            }

            let checksum = self.rx_buffer[3 + len];
            let calculated = calculate_checksum(&self.rx_buffer[1..3 + len]);
            if checksum != calculated{
                log::debug!("UART: checksum mismatch, expected {:#04x} got {:#04x}", calculated, checksum);
                self.rx_buffer.remove(0);
                continue;
            }

            let payload = self.rx_buffer[3..3 + len].to_vec();
            self.rx_buffer.drain(0..frame_len);

            match MsgType::from_u8(msg_type_byte){
                Some(msg_type) => return Some(UartFrame{ msg_type, payload }),
                None => log::debug!("UART: skipping frame of unknown type {:#04x}", msg_type_byte),
            }
        }
    }
}
