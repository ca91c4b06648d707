use pyo3::prelude::*;
use pyo3::exceptions::{PyOSError, PyRuntimeError};
use crate::auv::supervisor::{StartOutcome, StopOutcome};
use crate::config::AppConfig;
use crate::error::Error;
use crate::runtime::Runtime;

#[pyclass]
pub struct PyAuvSupervisor{
    inner: Runtime,
}

#[pymethods]
impl PyAuvSupervisor{
    /// Falls back to built-in defaults when no config path is given
    #[new]
    #[pyo3(signature = (config_path=None))]
    fn new(config_path: Option<&str>) -> PyResult<Self>{
        let config = match config_path{
            Some(path) => AppConfig::load(path).map_err(|e| PyOSError::new_err(e.to_string()))?,
            None => AppConfig::default(),
        };
        Ok(PyAuvSupervisor{ inner: Runtime::from_config(&config) })
    }

    /// True if a new run was launched, False if one was already active
    fn start(&self) -> PyResult<bool>{
        match self.inner.start(){
            Ok(StartOutcome::Started) => Ok(true),
            Ok(StartOutcome::AlreadyRunning) => Ok(false),
            Err(e @ Error::HardwareUnavailable) => Err(PyRuntimeError::new_err(e.to_string())),
            Err(e) => Err(PyOSError::new_err(e.to_string())),
        }
    }

    /// Blocks for at most the configured stop timeout
    fn stop(&self, py: Python<'_>) -> bool{
        let inner = &self.inner;
        py.allow_threads(|| inner.stop()) == StopOutcome::Stopped
    }

    /// (running, hardware_available)
    fn status(&self) -> (bool, bool){
        let status = self.inner.status();
        (status.running, status.hardware_available)
    }

    fn is_running(&self) -> bool{
        self.inner.status().running
    }
}

#[pymodule]
fn auv_supervisor(_py: Python, m: &PyModule) -> PyResult<()>{
    m.add_class::<PyAuvSupervisor>()?;
    Ok(())
}
