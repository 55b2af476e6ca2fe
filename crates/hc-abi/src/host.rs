//! Function pointer types of the ABI and the resolved host function table

use std::ffi::{c_char, c_int, c_void, CStr};

use hc_core::{HydraError, Result};

use crate::model::{AudioData, EnvironmentInfo, HostInfo, ImageData, InputRequest};
use crate::raw::*;
use crate::result::HcResult;

// Host functions, called by the core

pub type HcGetHostInfoPtr = unsafe extern "C" fn(host_info: *mut HcHostInfo);
/// `values[i]` receives the value for `requests[i]`
pub type HcGetInputsSyncPtr = unsafe extern "C" fn(
    requests: *const *const HcInputRequest,
    request_count: c_int,
    values: *const *mut i64,
) -> HcResult;
pub type HcReconfigureEnvironmentPtr =
    unsafe extern "C" fn(environment_info: *const HcEnvironmentInfo) -> HcResult;
pub type HcPushSamplesPtr = unsafe extern "C" fn(audio_data: *const HcAudioData) -> HcResult;
pub type HcSwPushVideoFramePtr = unsafe extern "C" fn(image: *const HcImageData) -> HcResult;
pub type HcGlMakeCurrentPtr = unsafe extern "C" fn() -> HcResult;
pub type HcGlSwapBuffersPtr = unsafe extern "C" fn() -> HcResult;
pub type HcGlGetProcAddressPtr = unsafe extern "C" fn(name: *const c_char) -> *mut c_void;
pub type HcSetCallbacksPtr = unsafe extern "C" fn(callbacks: *const HcCallbacks) -> HcResult;

/// Resolver the frontend hands to `hcInternalLoadFunctions`
pub type HcLoadFunctionPtr = unsafe extern "C" fn(name: *const c_char) -> *mut c_void;

// Core exports, called by the frontend

pub type HcGetCoreInfoFn = unsafe extern "C" fn(core_info: *mut HcCoreInfo);
pub type HcCreateFn = unsafe extern "C" fn(environment_info: *mut HcEnvironmentInfo) -> HcResult;
pub type HcDestroyFn = unsafe extern "C" fn(destroy_info: *const HcDestroyInfo) -> HcResult;
pub type HcResetFn = unsafe extern "C" fn(reset_info: *const HcResetInfo) -> HcResult;
pub type HcSetRunStateFn = unsafe extern "C" fn(run_info: *const HcRunStateInfo) -> HcResult;
pub type HcLoadContentFn = unsafe extern "C" fn(info: *const HcContentLoadInfo) -> HcResult;
pub type HcGetErrorFn = unsafe extern "C" fn() -> *const c_char;
pub type HcInternalLoadFunctionsFn =
    unsafe extern "C" fn(load_function: Option<HcLoadFunctionPtr>) -> HcResult;

/// Every host function, resolved.
///
/// Built once by [`crate::loader::HostBindingsBuilder`] and read-only
/// afterwards. The safe wrappers convert to and from the raw structures and
/// map result codes to [`HydraError`].
#[derive(Clone, Copy)]
pub struct HostBindings {
    pub get_host_info: HcGetHostInfoPtr,
    pub get_inputs_sync: HcGetInputsSyncPtr,
    pub reconfigure_environment: HcReconfigureEnvironmentPtr,
    pub push_samples: HcPushSamplesPtr,
    pub sw_push_video_frame: HcSwPushVideoFramePtr,
    pub gl_make_current: HcGlMakeCurrentPtr,
    pub gl_swap_buffers: HcGlSwapBuffersPtr,
    pub gl_get_proc_address: HcGlGetProcAddressPtr,
    pub set_callbacks: HcSetCallbacksPtr,
}

impl std::fmt::Debug for HostBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostBindings")
            .field("get_host_info", &(self.get_host_info as *const c_void))
            .field("set_callbacks", &(self.set_callbacks as *const c_void))
            .finish_non_exhaustive()
    }
}

impl HostBindings {
    pub fn host_info(&self) -> HostInfo {
        let mut raw = HcHostInfo::default();
        // SAFETY: the host fills a structure we own; strings it points at are
        // host-owned and copied immediately
        unsafe {
            (self.get_host_info)(&mut raw);
            HostInfo::from_raw(&raw)
        }
    }

    /// Ask for several input values at once. The returned values are in
    /// request order.
    pub fn get_inputs_sync(&self, requests: &[InputRequest]) -> Result<Vec<i64>> {
        let raw: Vec<HcInputRequest> = requests.iter().map(InputRequest::to_raw).collect();
        let request_ptrs: Vec<*const HcInputRequest> =
            raw.iter().map(|r| r as *const HcInputRequest).collect();
        let mut values = vec![0i64; requests.len()];
        let value_ptrs: Vec<*mut i64> = values.iter_mut().map(|v| v as *mut i64).collect();

        // SAFETY: all arrays have `requests.len()` live entries for the call
        let code = unsafe {
            (self.get_inputs_sync)(
                request_ptrs.as_ptr(),
                requests.len() as c_int,
                value_ptrs.as_ptr(),
            )
        };
        code.into_result(None)?;
        Ok(values)
    }

    pub fn reconfigure_environment(&self, environment: &EnvironmentInfo) -> Result<()> {
        let mut video = environment.video.map(|v| v.to_raw());
        let mut audio = environment.audio.map(|a| a.to_raw());
        let raw = HcEnvironmentInfo {
            drive_mode: environment.drive_mode.into(),
            video: video
                .as_mut()
                .map_or(std::ptr::null_mut(), |v| v as *mut HcVideoInfo),
            audio: audio
                .as_mut()
                .map_or(std::ptr::null_mut(), |a| a as *mut HcAudioInfo),
            ..Default::default()
        };
        // SAFETY: `raw` and its targets outlive the call
        unsafe { (self.reconfigure_environment)(&raw) }.into_result(None)
    }

    pub fn push_samples(&self, data: &AudioData<'_>) -> Result<()> {
        let raw = data.to_raw();
        // SAFETY: `data` borrows the samples for the duration of the call
        unsafe { (self.push_samples)(&raw) }.into_result(None)
    }

    pub fn push_video_frame(&self, image: &ImageData<'_>) -> Result<()> {
        let raw = image.to_raw();
        // SAFETY: `image` borrows the pixels for the duration of the call
        unsafe { (self.sw_push_video_frame)(&raw) }.into_result(None)
    }

    pub fn gl_make_current(&self) -> Result<()> {
        // SAFETY: no arguments
        unsafe { (self.gl_make_current)() }.into_result(None)
    }

    pub fn gl_swap_buffers(&self) -> Result<()> {
        // SAFETY: no arguments
        unsafe { (self.gl_swap_buffers)() }.into_result(None)
    }

    /// Address of an OpenGL function, null when unavailable
    pub fn gl_get_proc_address(&self, name: &CStr) -> *mut c_void {
        // SAFETY: `name` is a valid C string for the call
        unsafe { (self.gl_get_proc_address)(name.as_ptr()) }
    }

    /// Register run-frame or entry-point callbacks
    pub fn set_callbacks(&self, callbacks: &HcCallbacks) -> Result<()> {
        // SAFETY: the callbacks structure and its targets outlive the call
        unsafe { (self.set_callbacks)(callbacks) }.into_result(None)
    }

    /// Register the frontend-driven run-frame callback
    pub fn set_frontend_driven(&self, run_frame: HcVoidCallback) -> Result<()> {
        let mut frontend = HcFrontendDrivenCallbacks {
            run_frame: Some(run_frame),
            ..Default::default()
        };
        let callbacks = HcCallbacks {
            frontend_driven_callbacks: &mut frontend,
            ..Default::default()
        };
        self.set_callbacks(&callbacks)
    }

    /// Register the self-driven entry point
    pub fn set_self_driven(&self, entry_point: HcVoidCallback) -> Result<()> {
        let mut self_driven = HcSelfDrivenCallbacks {
            entry_point: Some(entry_point),
            ..Default::default()
        };
        let callbacks = HcCallbacks {
            self_driven_callbacks: &mut self_driven,
            ..Default::default()
        };
        self.set_callbacks(&callbacks)
    }
}

/// Fail with [`HydraError::WrapperNotInitialized`] when no bindings exist yet
pub fn require(bindings: Option<&HostBindings>) -> Result<&HostBindings> {
    bindings.ok_or(HydraError::WrapperNotInitialized)
}
