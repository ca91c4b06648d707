/**
 * Serial link to the STM32 board
 *
 * Opens the port once, splits it into a reader thread that decodes sensor
 * frames into the shared cache and a writer shared with the thruster adapter.
 */

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::adapters::{SerialActuator, SerialOrientation, SerialRange, SharedCache, SharedWriter};
use super::FrameDecoder;
use crate::auv::hardware::Hardware;
use crate::auv::types::Axis;
use crate::config::HardwareConfig;
use crate::error::Result;

const READ_TIMEOUT: Duration = Duration::from_millis(100);
const READ_ERROR_BACKOFF: Duration = Duration::from_millis(100);

pub struct SerialLink{
    port_name: String,
    cache: SharedCache,
    writer: SharedWriter,
    sample_timeout: Duration,
    running: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl SerialLink{
    pub fn open(config: &HardwareConfig) -> Result<SerialLink>{
        log::info!("UART: opening {} at {} baud", config.port, config.baud_rate);
        let port = serialport::new(&config.port, config.baud_rate)
            .timeout(READ_TIMEOUT)
            .open()?;
        let reader = port.try_clone()?;

        let cache = SharedCache::default();
        let running = Arc::new(AtomicBool::new(true));
        let handle = spawn_reader(reader, Arc::clone(&cache), Arc::clone(&running))?;
        log::info!("UART: connected to {}", config.port);

        let writer: Box<dyn Write + Send> = Box::new(port);
        Ok(SerialLink{
            port_name: config.port.clone(),
            cache,
            writer: Arc::new(Mutex::new(writer)),
            sample_timeout: config.sample_timeout(),
            running,
            reader: Some(handle),
        })
    }

    pub fn port_name(&self) -> &str{
        &self.port_name
    }

    /// Sensor and thruster adapters sharing this link
    pub fn hardware(&self) -> Hardware{
        let range = |axis| Arc::new(SerialRange::new(Arc::clone(&self.cache), axis, self.sample_timeout));
        Hardware{
            orientation: Arc::new(SerialOrientation::new(Arc::clone(&self.cache), self.sample_timeout)),
            front: range(Axis::Front),
            back: range(Axis::Back),
            bottom: range(Axis::Bottom),
            actuator: Arc::new(SerialActuator::new(Arc::clone(&self.writer))),
        }
    }
}

impl Drop for SerialLink{
    fn drop(&mut self){
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.reader.take(){
            let _ = handle.join();
        }
        log::info!("UART: closed {}", self.port_name);
    }
}

//decode frames into the cache until `running` clears
fn spawn_reader<R>(mut reader: R, cache: SharedCache, running: Arc<AtomicBool>) -> Result<JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    let handle = thread::Builder::new()
        .name("auv-uart-rx".to_string())
        .spawn(move ||{
            let mut decoder = FrameDecoder::new();
            let mut read_buf = [0u8; 256];

            while running.load(Ordering::SeqCst){
                match reader.read(&mut read_buf){
                    Ok(n) if n > 0 =>{
                        decoder.push(&read_buf[..n]);
                        let now = Instant::now();
                        let mut cache = cache.write().unwrap_or_else(|e| e.into_inner());
                        while let Some(frame) = decoder.next_frame(){
                            cache.apply(&frame, now);
                        }
                    }
                    Ok(_) => thread::sleep(Duration::from_millis(1)),
                    Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {}
                    Err(e) =>{
                        log::warn!("UART: read error: {}", e);
                        thread::sleep(READ_ERROR_BACKOFF);
                    }
                }
            }
        })?;
    Ok(handle)
}
