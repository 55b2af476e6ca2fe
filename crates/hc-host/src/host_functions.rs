//! The host functions handed to cores
//!
//! Each is an `extern "C"` function dispatching into the global
//! [`HostContext`](crate::context::HostContext). Failures are logged and
//! returned as result codes; a panic never crosses back into the core.

use std::ffi::{c_char, c_int, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, error, trace, warn};

use hc_abi::chain;
use hc_abi::export::panic_message;
use hc_abi::loader::symbol_name;
use hc_abi::raw::*;
use hc_abi::{AudioData, EnvironmentInfo, HcResult, ImageData, InputRequest, RendererType};
use hc_core::{HydraError, Result};

use crate::callbacks::RegisteredCallbacks;
use crate::context::host_context;

fn host_call(name: &str, f: impl FnOnce() -> Result<()>) -> HcResult {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => HcResult::SUCCESS,
        Ok(Err(err)) => {
            warn!("{} rejected: {}", name, err);
            HcResult::from(&err)
        }
        Err(payload) => {
            error!("{} panicked: {}", name, panic_message(&*payload));
            HcResult::ERROR_CORE
        }
    }
}

/// Log the extension chain behind `next` when chain tracing is enabled
unsafe fn trace_chain(name: &str, next: *mut c_void) {
    if !host_context().trace_chains() {
        return;
    }
    for entry in chain::walk(next) {
        debug!(
            "{}: chained {:?}{}",
            name,
            entry.structure_type(),
            if entry.is_known() { "" } else { " (skipped)" }
        );
    }
}

unsafe extern "C" fn host_get_host_info(host_info: *mut HcHostInfo) {
    let _ = host_call("hcGetHostInfo", || {
        let out = host_info
            .as_mut()
            .ok_or(HydraError::NullDataPassed("host info"))?;
        host_context().write_host_info(out);
        Ok(())
    });
}

unsafe extern "C" fn host_get_inputs_sync(
    requests: *const *const HcInputRequest,
    request_count: c_int,
    values: *const *mut i64,
) -> HcResult {
    host_call("hcGetInputsSync", || {
        let count = usize::try_from(request_count).map_err(|_| {
            HydraError::BadInputRequest(format!("negative request count {}", request_count))
        })?;
        if count == 0 {
            return Ok(());
        }
        if requests.is_null() {
            return Err(HydraError::NullDataPassed("input requests"));
        }
        if values.is_null() {
            return Err(HydraError::NullDataPassed("input values"));
        }

        let raw_requests = std::slice::from_raw_parts(requests, count);
        let targets = std::slice::from_raw_parts(values, count);
        if targets.iter().any(|target| target.is_null()) {
            return Err(HydraError::NullDataPassed("input value"));
        }

        let mut parsed = Vec::with_capacity(count);
        for &request in raw_requests {
            let request = request
                .as_ref()
                .ok_or(HydraError::NullDataPassed("input request"))?;
            parsed.push(InputRequest::try_from(request)?);
        }

        let answers = host_context().with_input(|input| input.read_all(&parsed))?;
        for (target, value) in targets.iter().zip(answers) {
            **target = value;
        }
        trace!("Answered {} input requests", count);
        Ok(())
    })
}

unsafe extern "C" fn host_reconfigure_environment(
    environment_info: *const HcEnvironmentInfo,
) -> HcResult {
    host_call("hcReconfigureEnvironment", || {
        let raw = environment_info
            .as_ref()
            .ok_or(HydraError::NullDataPassed("environment info"))?;
        trace_chain("hcReconfigureEnvironment", raw.next);
        let environment = EnvironmentInfo::from_raw(raw)?;
        host_context().reconfigure(environment)
    })
}

unsafe extern "C" fn host_push_samples(audio_data: *const HcAudioData) -> HcResult {
    host_call("hcPushSamples", || {
        let raw = audio_data
            .as_ref()
            .ok_or(HydraError::NullDataPassed("audio data"))?;
        trace_chain("hcPushSamples", raw.next);
        let data = AudioData::from_raw(raw)?;
        host_context().shared().with_audio(|queue| queue.push(&data))
    })
}

unsafe extern "C" fn host_sw_push_video_frame(image: *const HcImageData) -> HcResult {
    host_call("hcSwPushVideoFrame", || {
        let raw = image
            .as_ref()
            .ok_or(HydraError::NullDataPassed("image data"))?;
        trace_chain("hcSwPushVideoFrame", raw.next);
        let image = ImageData::from_raw(raw)?;
        host_context().shared().with_video(|sink| sink.push(&image))
    })
}

/// This host has no OpenGL context to offer
fn require_gl() -> Result<()> {
    let renderer = host_context()
        .environment()
        .and_then(|env| env.video)
        .map(|video| video.renderer);
    match renderer {
        Some(RendererType::OpenGl | RendererType::OpenGlEs) => Err(HydraError::Core(
            "no OpenGL context available".to_string(),
        )),
        _ => Err(HydraError::NotOpenGlRendered),
    }
}

unsafe extern "C" fn host_gl_make_current() -> HcResult {
    host_call("hcGlMakeCurrent", require_gl)
}

unsafe extern "C" fn host_gl_swap_buffers() -> HcResult {
    host_call("hcGlSwapBuffers", require_gl)
}

unsafe extern "C" fn host_gl_get_proc_address(name: *const c_char) -> *mut c_void {
    debug!(
        "hcGlGetProcAddress({}) unavailable",
        symbol_name(name).unwrap_or("<invalid>")
    );
    std::ptr::null_mut()
}

unsafe extern "C" fn host_set_callbacks(callbacks: *const HcCallbacks) -> HcResult {
    host_call("hcSetCallbacks", || {
        let raw = callbacks
            .as_ref()
            .ok_or(HydraError::NullDataPassed("callbacks"))?;
        trace_chain("hcSetCallbacks", raw.next);
        let registered = RegisteredCallbacks::from_raw(raw)?;
        host_context().register_callbacks(registered)
    })
}

/// Address of the host function called `name`
pub fn host_symbol(name: &str) -> Option<*mut c_void> {
    let address = match name {
        "hcGetHostInfo" => host_get_host_info as *mut c_void,
        "hcGetInputsSync" => host_get_inputs_sync as *mut c_void,
        "hcReconfigureEnvironment" => host_reconfigure_environment as *mut c_void,
        "hcPushSamples" => host_push_samples as *mut c_void,
        "hcSwPushVideoFrame" => host_sw_push_video_frame as *mut c_void,
        "hcGlMakeCurrent" => host_gl_make_current as *mut c_void,
        "hcGlSwapBuffers" => host_gl_swap_buffers as *mut c_void,
        "hcGlGetProcAddress" => host_gl_get_proc_address as *mut c_void,
        "hcSetCallbacks" => host_set_callbacks as *mut c_void,
        _ => return None,
    };
    Some(address)
}

/// Resolver passed to `hcInternalLoadFunctions`. Unknown names resolve to null.
///
/// # Safety
/// `name` must be null or a valid C string.
pub unsafe extern "C" fn resolve_host_symbol(name: *const c_char) -> *mut c_void {
    match symbol_name(name).and_then(host_symbol) {
        Some(address) => address,
        None => {
            warn!(
                "Core asked for unknown host function {:?}",
                symbol_name(name)
            );
            std::ptr::null_mut()
        }
    }
}
