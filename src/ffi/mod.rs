use std::ffi::{c_char, CStr};
use std::ptr;
use libc::c_int;
use crate::auv::supervisor::{StartOutcome, StopOutcome};
use crate::config::AppConfig;
use crate::error::Error;
use crate::runtime::Runtime;

pub const AUV_OK: c_int = 0;
pub const AUV_ALREADY: c_int = 1;
pub const AUV_ERR_NULL: c_int = -1;
pub const AUV_ERR_NO_HARDWARE: c_int = -2;
pub const AUV_ERR_FAILED: c_int = -3;

pub struct AuvSupervisor{
    inner: Runtime,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuvStatus{
    pub running: bool,
    pub hardware_available: bool,
}

//null path means built-in defaults
unsafe fn load_config(config_path: *const c_char) -> Option<AppConfig>{
    if config_path.is_null(){
        return Some(AppConfig::default());
    }
    let path = unsafe{ CStr::from_ptr(config_path) }.to_str().ok()?;
    match AppConfig::load(path){
        Ok(config) => Some(config),
        Err(e) =>{
            log::error!("FFI: failed to load config {}: {}", path, e);
            None
        }
    }
}

/// Returns null when the config cannot be loaded. A missing serial port is
/// not an error: the supervisor comes up without hardware.
#[no_mangle]
pub unsafe extern "C" fn auv_supervisor_open(config_path: *const c_char) -> *mut AuvSupervisor{
    match unsafe{ load_config(config_path) }{
        Some(config) => Box::into_raw(Box::new(AuvSupervisor{ inner: Runtime::from_config(&config) })),
        None => ptr::null_mut(),
    }
}

/// Stops any active run before releasing the handle
#[no_mangle]
pub unsafe extern "C" fn auv_supervisor_free(supervisor: *mut AuvSupervisor){
    if !supervisor.is_null(){
        unsafe{ drop(Box::from_raw(supervisor)); }
    }
}

#[no_mangle]
pub unsafe extern "C" fn auv_supervisor_start(supervisor: *mut AuvSupervisor) -> c_int{
    if supervisor.is_null(){
        return AUV_ERR_NULL;
    }

    let s = unsafe{ &*supervisor };
    match s.inner.start(){
        Ok(StartOutcome::Started) => AUV_OK,
        Ok(StartOutcome::AlreadyRunning) => AUV_ALREADY,
        Err(Error::HardwareUnavailable) => AUV_ERR_NO_HARDWARE,
        Err(e) =>{
            log::error!("FFI: start failed: {}", e);
            AUV_ERR_FAILED
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn auv_supervisor_stop(supervisor: *mut AuvSupervisor) -> c_int{
    if supervisor.is_null(){
        return AUV_ERR_NULL;
    }

    let s = unsafe{ &*supervisor };
    match s.inner.stop(){
        StopOutcome::Stopped => AUV_OK,
        StopOutcome::AlreadyStopped => AUV_ALREADY,
    }
}

#[no_mangle]
pub unsafe extern "C" fn auv_supervisor_status(
    supervisor: *mut AuvSupervisor,
    out_status: *mut AuvStatus,
) -> c_int{
    if supervisor.is_null() || out_status.is_null(){
        return AUV_ERR_NULL;
    }

    unsafe{
        let status = (*supervisor).inner.status();
        *out_status = AuvStatus{
            running: status.running,
            hardware_available: status.hardware_available,
        };
    }
    AUV_OK
}
