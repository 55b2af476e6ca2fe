//! Core-side export glue
//!
//! A core implements [`CoreModule`] and invokes [`core_export!`](crate::core_export)
//! once. The macro emits the eight C exports, each of which forwards into a
//! process-wide [`CoreSlot`]. The slot converts raw structures, enforces the
//! single-instance rule and the run-state protocol, and funnels every `Err`
//! into the last-error string.

use std::ffi::{c_char, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use hc_core::{HydraError, Result};

pub use once_cell::sync::Lazy;

use crate::host::{HcLoadFunctionPtr, HostBindings};
use crate::loader::load_host_functions;
use crate::model::*;
use crate::raw::*;
use crate::result::HcResult;
use crate::run_state::RunStateCell;

/// Only one instance per loaded library in this ABI revision
pub const MAX_INSTANCES: usize = 1;

/// A core implementation behind the C exports
pub trait CoreModule: Send + Sized + 'static {
    /// Static metadata, requested before any instance exists
    fn core_info() -> CoreInfo;

    /// Create the instance and describe the environment it needs
    fn create(host: Arc<HostBindings>) -> Result<(Self, EnvironmentInfo)>;

    /// Called before the instance is dropped
    fn destroy(&mut self) {}

    fn reset(&mut self, reset_type: ResetType) -> Result<()>;

    /// Notification of an accepted run-state change
    fn set_run_state(&mut self, _state: RunState) -> Result<()> {
        Ok(())
    }

    fn load_content(&mut self, content: &ContentLoad) -> Result<()>;

    /// One frame, for frontend-driven cores
    fn run_frame(&mut self) -> Result<()> {
        Err(HydraError::WrongDriveMode(
            "core is not frontend driven".to_string(),
        ))
    }

    /// One iteration of the self-driven loop. The loop only calls it while
    /// the run state is `Running`.
    fn run_step(&mut self) -> Result<()> {
        Err(HydraError::WrongDriveMode("core is not self driven".to_string()))
    }
}

static LAST_ERROR: Lazy<Mutex<Option<CString>>> = Lazy::new(|| Mutex::new(None));

/// Record `err` as the string `hcGetError` returns
pub fn set_last_error(err: &HydraError) {
    let message = to_cstring(&err.to_string());
    *LAST_ERROR.lock() = Some(message);
}

/// Last error string, null when no call has failed yet.
///
/// The pointer stays valid until the next failing call replaces it.
pub fn last_error_ptr() -> *const c_char {
    LAST_ERROR
        .lock()
        .as_ref()
        .map_or(std::ptr::null(), |s| s.as_ptr())
}

/// Last error as a Rust string
pub fn last_error() -> Option<String> {
    LAST_ERROR
        .lock()
        .as_ref()
        .map(|s| s.to_string_lossy().into_owned())
}

pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `f`, turning errors and panics into a result code
pub fn guard<F>(call: &str, f: F) -> HcResult
where
    F: FnOnce() -> Result<()>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => HcResult::SUCCESS,
        Ok(Err(err)) => {
            warn!("{} failed: {}", call, err);
            set_last_error(&err);
            HcResult::from(&err)
        }
        Err(payload) => {
            let err = HydraError::Core(format!("{} panicked: {}", call, panic_message(&*payload)));
            error!("{}", err);
            set_last_error(&err);
            HcResult::ERROR_CORE
        }
    }
}

/// Callbacks the export macro generates for a core type
#[derive(Clone, Copy)]
pub struct ExportCallbacks {
    pub run_frame: HcVoidCallback,
    pub entry_point: HcVoidCallback,
}

/// Process-wide state behind the exports of one core library
pub struct CoreSlot<T: CoreModule> {
    instance: Mutex<Option<T>>,
    run_state: RunStateCell,
    drive_mode: Mutex<Option<DriveMode>>,
    host: RwLock<Option<Arc<HostBindings>>>,
    info: OnceCell<Box<CoreInfoStorage>>,
}

impl<T: CoreModule> Default for CoreSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: CoreModule> CoreSlot<T> {
    pub fn new() -> Self {
        Self {
            instance: Mutex::new(None),
            run_state: RunStateCell::new(),
            drive_mode: Mutex::new(None),
            host: RwLock::new(None),
            info: OnceCell::new(),
        }
    }

    /// `hcInternalLoadFunctions`
    pub fn load_functions(&self, load_function: Option<HcLoadFunctionPtr>) -> Result<()> {
        let bindings = load_host_functions(load_function)?;
        *self.host.write() = Some(Arc::new(bindings));
        info!("Host functions loaded");
        Ok(())
    }

    pub fn host(&self) -> Result<Arc<HostBindings>> {
        self.host
            .read()
            .clone()
            .ok_or(HydraError::WrapperNotInitialized)
    }

    pub fn core_info(&self) -> &CoreInfoStorage {
        self.info.get_or_init(|| CoreInfoStorage::new(&T::core_info()))
    }

    pub fn run_state(&self) -> RunState {
        self.run_state.get()
    }

    pub fn drive_mode(&self) -> Option<DriveMode> {
        *self.drive_mode.lock()
    }

    pub fn is_created(&self) -> bool {
        self.instance.lock().is_some()
    }

    /// Run `f` on the live instance under the instance lock
    pub fn with_instance<R>(&self, f: impl FnOnce(&mut T) -> Result<R>) -> Result<R> {
        let mut instance = self.instance.lock();
        let core = instance
            .as_mut()
            .ok_or_else(|| HydraError::Core("core has not been created".to_string()))?;
        f(core)
    }

    /// `hcGetCoreInfo`
    ///
    /// # Safety
    /// `out` must be null or point to a writable `HcCoreInfo`.
    pub unsafe fn get_core_info(&self, out: *mut HcCoreInfo) {
        if let Some(out) = out.as_mut() {
            self.core_info().write_to(out);
        }
    }

    /// `hcCreate`
    ///
    /// # Safety
    /// `env` must be null or point to a valid `HcEnvironmentInfo` whose video
    /// and audio pointers are null or writable.
    pub unsafe fn create(&self, env: *mut HcEnvironmentInfo, callbacks: ExportCallbacks) -> Result<()> {
        let env = env
            .as_mut()
            .ok_or(HydraError::NullDataPassed("environment info"))?;
        let host = self.host()?;

        let mut instance = self.instance.lock();
        if instance.is_some() {
            return Err(HydraError::TooManyInstances {
                limit: MAX_INSTANCES,
            });
        }

        let (mut core, environment) = T::create(Arc::clone(&host))?;
        if let Err(err) = Self::publish(&host, &environment, env, callbacks) {
            core.destroy();
            return Err(err);
        }

        self.run_state.clear();
        *self.drive_mode.lock() = Some(environment.drive_mode);
        *instance = Some(core);
        info!("Core created, {:?}", environment.drive_mode);
        Ok(())
    }

    /// Hand the environment back to the frontend and register the callback
    /// matching the drive mode
    unsafe fn publish(
        host: &HostBindings,
        environment: &EnvironmentInfo,
        out: &mut HcEnvironmentInfo,
        callbacks: ExportCallbacks,
    ) -> Result<()> {
        if let Some(video) = &environment.video {
            if !host.host_info().supports(video.renderer) {
                return Err(HydraError::BadRendererVersion(format!(
                    "host does not provide {:?}",
                    video.renderer
                )));
            }
        }
        environment.write_raw(out)?;

        match environment.drive_mode {
            DriveMode::FrontendDriven => host.set_frontend_driven(callbacks.run_frame),
            DriveMode::SelfDriven | DriveMode::SelfDrivenExceptAudio => {
                host.set_self_driven(callbacks.entry_point)
            }
        }
    }

    /// `hcDestroy`. Forces the run state to `Quit` so a self-driven loop ends.
    ///
    /// # Safety
    /// `info` must be null or point to a valid `HcDestroyInfo`.
    pub unsafe fn destroy(&self, info: *const HcDestroyInfo) -> Result<()> {
        if info.is_null() {
            return Err(HydraError::NullDataPassed("destroy info"));
        }
        // Quit is reachable from every state
        let _ = self.run_state.set(RunState::Quit);

        let taken = self.instance.lock().take();
        match taken {
            Some(mut core) => {
                core.destroy();
                *self.drive_mode.lock() = None;
                info!("Core destroyed");
            }
            None => debug!("hcDestroy without a live instance"),
        }
        Ok(())
    }

    /// `hcReset`
    ///
    /// # Safety
    /// `info` must be null or point to a valid `HcResetInfo`.
    pub unsafe fn reset(&self, info: *const HcResetInfo) -> Result<()> {
        let info = info.as_ref().ok_or(HydraError::NullDataPassed("reset info"))?;
        let reset_type = ResetType::try_from(info.reset_type)
            .map_err(|t| HydraError::Core(format!("unknown reset type {:?}", t)))?;
        self.with_instance(|core| core.reset(reset_type))
    }

    /// `hcSetRunState`
    ///
    /// # Safety
    /// `info` must be null or point to a valid `HcRunStateInfo`.
    pub unsafe fn set_run_state(&self, info: *const HcRunStateInfo) -> Result<()> {
        let info = info
            .as_ref()
            .ok_or(HydraError::NullDataPassed("run state info"))?;
        let next = RunState::try_from(info.run_state)
            .map_err(|s| HydraError::Core(format!("unknown run state {:?}", s)))?;
        self.request_run_state(next)
    }

    /// Validate and apply a run-state change, then notify the instance
    pub fn request_run_state(&self, next: RunState) -> Result<()> {
        if !self.is_created() {
            return Err(HydraError::Core("core has not been created".to_string()));
        }
        let previous = self.run_state.set(next)?;
        if previous != next {
            self.with_instance(|core| core.set_run_state(next))?;
        }
        Ok(())
    }

    /// `hcLoadContent`
    ///
    /// # Safety
    /// `info` must be null or point to a valid `HcContentLoadInfo`.
    pub unsafe fn load_content(&self, info: *const HcContentLoadInfo) -> Result<()> {
        let info = info
            .as_ref()
            .ok_or(HydraError::NullDataPassed("content load info"))?;
        let content = ContentLoad::from_raw(info)?;
        self.check_content(&content)?;
        self.with_instance(|core| core.load_content(&content))
    }

    fn check_content(&self, content: &ContentLoad) -> Result<()> {
        let info = T::core_info();
        if info.loadable_content.is_empty() || content.name.is_empty() {
            return Ok(());
        }
        match info.content(&content.name) {
            Some(kind) => {
                let ext = content
                    .path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or_default();
                if kind.extensions.is_empty() || kind.matches_extension(ext) {
                    Ok(())
                } else {
                    Err(HydraError::BadContent(format!(
                        "{} does not match extensions {}",
                        content.path.display(),
                        kind.extensions
                    )))
                }
            }
            None => Err(HydraError::BadContent(format!(
                "unknown content kind {}",
                content.name
            ))),
        }
    }

    /// Body of the generated run-frame callback
    pub fn run_frame(&self) {
        if self.run_state.get() == RunState::Quit {
            return;
        }
        let mut instance = self.instance.lock();
        let Some(core) = instance.as_mut() else {
            debug!("run_frame without a live instance");
            return;
        };
        let result = catch_unwind(AssertUnwindSafe(|| core.run_frame()));
        drop(instance);
        self.report("run_frame", result);
    }

    /// Body of the generated self-driven entry point. Returns once the run
    /// state is `Quit`, the instance is gone, or a step fails.
    pub fn entry_point(&self) {
        info!("Self-driven loop started");
        loop {
            if self.run_state.wait_runnable() == RunState::Quit {
                break;
            }
            let mut instance = self.instance.lock();
            let Some(core) = instance.as_mut() else {
                break;
            };
            let result = catch_unwind(AssertUnwindSafe(|| core.run_step()));
            drop(instance);
            if !self.report("run_step", result) {
                break;
            }
        }
        info!("Self-driven loop finished");
    }

    fn report(&self, call: &str, result: std::thread::Result<Result<()>>) -> bool {
        match result {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!("{} failed: {}", call, err);
                set_last_error(&err);
                false
            }
            Err(payload) => {
                let err = HydraError::Core(format!("{} panicked: {}", call, panic_message(&*payload)));
                error!("{}", err);
                set_last_error(&err);
                false
            }
        }
    }
}

/// Emit the C exports of a core library for a type implementing
/// [`CoreModule`].
///
/// Also defines `core_slot()`, giving in-process frontends and tests access
/// to the slot behind the exports.
#[macro_export]
macro_rules! core_export {
    ($core:ty) => {
        static __HC_CORE_SLOT: $crate::export::Lazy<$crate::export::CoreSlot<$core>> =
            $crate::export::Lazy::new($crate::export::CoreSlot::new);

        unsafe extern "C" fn __hc_run_frame() {
            __HC_CORE_SLOT.run_frame();
        }

        unsafe extern "C" fn __hc_entry_point() {
            __HC_CORE_SLOT.entry_point();
        }

        /// Slot behind this library's exports
        pub fn core_slot() -> &'static $crate::export::CoreSlot<$core> {
            &__HC_CORE_SLOT
        }

        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn hcGetCoreInfo(core_info: *mut $crate::raw::HcCoreInfo) {
            let _ = ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| {
                __HC_CORE_SLOT.get_core_info(core_info)
            }));
        }

        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn hcCreate(
            environment_info: *mut $crate::raw::HcEnvironmentInfo,
        ) -> $crate::result::HcResult {
            $crate::export::guard("hcCreate", || {
                __HC_CORE_SLOT.create(
                    environment_info,
                    $crate::export::ExportCallbacks {
                        run_frame: __hc_run_frame,
                        entry_point: __hc_entry_point,
                    },
                )
            })
        }

        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn hcDestroy(
            destroy_info: *const $crate::raw::HcDestroyInfo,
        ) -> $crate::result::HcResult {
            $crate::export::guard("hcDestroy", || __HC_CORE_SLOT.destroy(destroy_info))
        }

        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn hcReset(
            reset_info: *const $crate::raw::HcResetInfo,
        ) -> $crate::result::HcResult {
            $crate::export::guard("hcReset", || __HC_CORE_SLOT.reset(reset_info))
        }

        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn hcSetRunState(
            run_info: *const $crate::raw::HcRunStateInfo,
        ) -> $crate::result::HcResult {
            $crate::export::guard("hcSetRunState", || __HC_CORE_SLOT.set_run_state(run_info))
        }

        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn hcLoadContent(
            info: *const $crate::raw::HcContentLoadInfo,
        ) -> $crate::result::HcResult {
            $crate::export::guard("hcLoadContent", || __HC_CORE_SLOT.load_content(info))
        }

        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn hcGetError() -> *const ::std::ffi::c_char {
            $crate::export::last_error_ptr()
        }

        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn hcInternalLoadFunctions(
            load_function: ::std::option::Option<$crate::host::HcLoadFunctionPtr>,
        ) -> $crate::result::HcResult {
            $crate::export::guard("hcInternalLoadFunctions", || {
                __HC_CORE_SLOT.load_functions(load_function)
            })
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_maps_errors_and_panics() {
        assert_eq!(guard("ok", || Ok(())), HcResult::SUCCESS);

        let code = guard("content", || Err(HydraError::BadContent("no header".into())));
        assert_eq!(code, HcResult::ERROR_BAD_CONTENT);
        assert_eq!(last_error().as_deref(), Some("Bad content: no header"));
        assert!(!last_error_ptr().is_null());

        // Success leaves the previous message in place
        assert_eq!(guard("ok", || Ok(())), HcResult::SUCCESS);
        assert_eq!(last_error().as_deref(), Some("Bad content: no header"));

        let code = guard("explode", || panic!("boom"));
        assert_eq!(code, HcResult::ERROR_CORE);
        assert_eq!(last_error().as_deref(), Some("Core error: explode panicked: boom"));
    }
}
