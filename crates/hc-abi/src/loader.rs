//! Host function loader
//!
//! The frontend passes a resolver to the core, which looks up every host
//! function by name in a fixed order. Resolution stops at the first name the
//! resolver does not know; slots filled before it keep their pointers.

use std::ffi::{c_char, c_void, CStr, CString};

use tracing::{debug, error};

use hc_core::{HydraError, Result};

use crate::host::*;

/// Host function names in resolution order
pub const HOST_FUNCTION_NAMES: [&str; 9] = [
    "hcGetHostInfo",
    "hcGetInputsSync",
    "hcReconfigureEnvironment",
    "hcPushSamples",
    "hcSwPushVideoFrame",
    "hcGlMakeCurrent",
    "hcGlSwapBuffers",
    "hcGlGetProcAddress",
    "hcSetCallbacks",
];

/// Accumulates resolved host function addresses
#[derive(Debug)]
pub struct HostBindingsBuilder {
    slots: [*mut c_void; HOST_FUNCTION_NAMES.len()],
}

impl Default for HostBindingsBuilder {
    fn default() -> Self {
        Self {
            slots: [std::ptr::null_mut(); HOST_FUNCTION_NAMES.len()],
        }
    }
}

impl HostBindingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve through the C resolver handed to `hcInternalLoadFunctions`.
    ///
    /// A missing resolver fails with `BadLoadFunctionPtr` before any lookup.
    pub fn resolve(&mut self, load_function: Option<HcLoadFunctionPtr>) -> Result<()> {
        let load_function = load_function.ok_or_else(|| {
            error!("hcInternalLoadFunctions called without a resolver");
            HydraError::BadLoadFunctionPtr
        })?;
        // SAFETY: the resolver receives a valid C string and returns an address or null
        self.resolve_with(|name| unsafe { load_function(name.as_ptr()) })
    }

    /// Resolve through a Rust closure
    pub fn resolve_with<F>(&mut self, mut resolver: F) -> Result<()>
    where
        F: FnMut(&CStr) -> *mut c_void,
    {
        for (slot, name) in self.slots.iter_mut().zip(HOST_FUNCTION_NAMES) {
            let c_name = CString::new(name).map_err(|e| HydraError::Core(e.to_string()))?;
            let address = resolver(&c_name);
            if address.is_null() {
                error!("Host function {} could not be resolved", name);
                return Err(HydraError::MissingFunction(name.to_string()));
            }
            *slot = address;
            debug!("Resolved host function {} at {:p}", name, address);
        }
        Ok(())
    }

    pub fn is_resolved(&self) -> bool {
        self.slots.iter().all(|s| !s.is_null())
    }

    /// Address stored for `name`, null when unset or unknown
    pub fn slot(&self, name: &str) -> *mut c_void {
        HOST_FUNCTION_NAMES
            .iter()
            .position(|n| *n == name)
            .map_or(std::ptr::null_mut(), |i| self.slots[i])
    }

    /// Produce the bindings table. Fails closed when any slot is unset.
    pub fn build(&self) -> Result<HostBindings> {
        if let Some(index) = self.slots.iter().position(|s| s.is_null()) {
            return Err(HydraError::MissingFunction(HOST_FUNCTION_NAMES[index].to_string()));
        }
        let [a, b, c, d, e, f, g, h, i] = self.slots;
        // SAFETY: every slot is non-null and was returned by the resolver for
        // the function of that name, whose signature is fixed by the ABI
        unsafe {
            Ok(HostBindings {
                get_host_info: std::mem::transmute::<*mut c_void, HcGetHostInfoPtr>(a),
                get_inputs_sync: std::mem::transmute::<*mut c_void, HcGetInputsSyncPtr>(b),
                reconfigure_environment: std::mem::transmute::<
                    *mut c_void,
                    HcReconfigureEnvironmentPtr,
                >(c),
                push_samples: std::mem::transmute::<*mut c_void, HcPushSamplesPtr>(d),
                sw_push_video_frame: std::mem::transmute::<*mut c_void, HcSwPushVideoFramePtr>(e),
                gl_make_current: std::mem::transmute::<*mut c_void, HcGlMakeCurrentPtr>(f),
                gl_swap_buffers: std::mem::transmute::<*mut c_void, HcGlSwapBuffersPtr>(g),
                gl_get_proc_address: std::mem::transmute::<*mut c_void, HcGlGetProcAddressPtr>(h),
                set_callbacks: std::mem::transmute::<*mut c_void, HcSetCallbacksPtr>(i),
            })
        }
    }
}

/// Resolve and build in one step
pub fn load_host_functions(load_function: Option<HcLoadFunctionPtr>) -> Result<HostBindings> {
    let mut builder = HostBindingsBuilder::new();
    builder.resolve(load_function)?;
    builder.build()
}

/// Name as Rust string, for resolvers implemented in Rust
///
/// # Safety
/// `name` must be null or a valid C string.
pub unsafe fn symbol_name<'a>(name: *const c_char) -> Option<&'a str> {
    if name.is_null() {
        None
    } else {
        CStr::from_ptr(name).to_str().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::*;
    use crate::result::HcResult;
    use std::sync::atomic::{AtomicUsize, Ordering};

    unsafe extern "C" fn fake_host_info(info: *mut HcHostInfo) {
        (*info).gpu_vendor = c"Fake GPU".as_ptr();
    }
    unsafe extern "C" fn fake_inputs(
        requests: *const *const HcInputRequest,
        count: i32,
        values: *const *mut i64,
    ) -> HcResult {
        for i in 0..count as usize {
            let request = &**requests.add(i);
            **values.add(i) = i64::from(request.port) * 10;
        }
        HcResult::SUCCESS
    }
    unsafe extern "C" fn fake_env(_: *const HcEnvironmentInfo) -> HcResult {
        HcResult::SUCCESS
    }
    unsafe extern "C" fn fake_samples(_: *const HcAudioData) -> HcResult {
        HcResult::ERROR_AUDIO_OVERRUN
    }
    unsafe extern "C" fn fake_frame(_: *const HcImageData) -> HcResult {
        HcResult::SUCCESS
    }
    unsafe extern "C" fn fake_gl() -> HcResult {
        HcResult::ERROR_NOT_OPENGL_RENDERED
    }
    unsafe extern "C" fn fake_proc(_: *const c_char) -> *mut c_void {
        std::ptr::null_mut()
    }
    unsafe extern "C" fn fake_callbacks(_: *const HcCallbacks) -> HcResult {
        HcResult::SUCCESS
    }

    fn fake_address(name: &str) -> *mut c_void {
        match name {
            "hcGetHostInfo" => fake_host_info as *mut c_void,
            "hcGetInputsSync" => fake_inputs as *mut c_void,
            "hcReconfigureEnvironment" => fake_env as *mut c_void,
            "hcPushSamples" => fake_samples as *mut c_void,
            "hcSwPushVideoFrame" => fake_frame as *mut c_void,
            "hcGlMakeCurrent" | "hcGlSwapBuffers" => fake_gl as *mut c_void,
            "hcGlGetProcAddress" => fake_proc as *mut c_void,
            "hcSetCallbacks" => fake_callbacks as *mut c_void,
            _ => std::ptr::null_mut(),
        }
    }

    static C_LOOKUPS: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn c_resolver(name: *const c_char) -> *mut c_void {
        C_LOOKUPS.fetch_add(1, Ordering::SeqCst);
        symbol_name(name).map_or(std::ptr::null_mut(), fake_address)
    }

    #[test]
    fn test_resolves_every_function() {
        let mut builder = HostBindingsBuilder::new();
        let mut order = Vec::new();
        builder
            .resolve_with(|name| {
                let name = name.to_str().unwrap();
                order.push(name.to_string());
                fake_address(name)
            })
            .unwrap();
        assert!(builder.is_resolved());
        assert_eq!(order, HOST_FUNCTION_NAMES);
        assert_eq!(builder.slot("hcPushSamples"), fake_samples as *mut c_void);

        let bindings = builder.build().unwrap();
        assert_eq!(bindings.host_info().gpu_vendor.as_deref(), Some("Fake GPU"));
    }

    #[test]
    fn test_c_resolver() {
        let bindings = load_host_functions(Some(c_resolver)).unwrap();
        assert!(C_LOOKUPS.load(Ordering::SeqCst) >= HOST_FUNCTION_NAMES.len());

        let inputs = [
            crate::model::InputRequest {
                port: 1,
                input_type: crate::enums::HcInputType(3),
            },
            crate::model::InputRequest {
                port: 2,
                input_type: crate::enums::HcInputType(3),
            },
        ];
        assert_eq!(bindings.get_inputs_sync(&inputs).unwrap(), vec![10, 20]);
        assert!(matches!(
            bindings.gl_swap_buffers(),
            Err(HydraError::NotOpenGlRendered)
        ));
        assert!(bindings.gl_get_proc_address(c"glClear").is_null());
    }

    #[test]
    fn test_missing_function_keeps_earlier_slots() {
        let mut builder = HostBindingsBuilder::new();
        let mut calls = 0;
        let err = builder
            .resolve_with(|name| {
                calls += 1;
                match name.to_str().unwrap() {
                    "hcSwPushVideoFrame" => std::ptr::null_mut(),
                    other => fake_address(other),
                }
            })
            .unwrap_err();

        assert!(matches!(&err, HydraError::MissingFunction(n) if n == "hcSwPushVideoFrame"));
        assert_eq!(calls, 5);
        assert!(!builder.is_resolved());
        for name in &HOST_FUNCTION_NAMES[..4] {
            assert!(!builder.slot(name).is_null(), "{} should stay resolved", name);
        }
        for name in &HOST_FUNCTION_NAMES[4..] {
            assert!(builder.slot(name).is_null(), "{} should stay unset", name);
        }
        assert!(matches!(
            builder.build(),
            Err(HydraError::MissingFunction(n)) if n == "hcSwPushVideoFrame"
        ));
    }

    #[test]
    fn test_null_resolver() {
        let mut builder = HostBindingsBuilder::new();
        let err = builder.resolve(None).unwrap_err();
        assert!(matches!(err, HydraError::BadLoadFunctionPtr));
        assert!(HOST_FUNCTION_NAMES
            .iter()
            .all(|name| builder.slot(name).is_null()));
        assert!(matches!(
            load_host_functions(None),
            Err(HydraError::BadLoadFunctionPtr)
        ));
    }

    #[test]
    fn test_unknown_slot_name() {
        assert!(HostBindingsBuilder::new().slot("hcNotAFunction").is_null());
    }
}
