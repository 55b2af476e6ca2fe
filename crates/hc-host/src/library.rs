//! Core libraries and their exports

use std::ffi::CString;
use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::{debug, info};

use hc_abi::enums::{HcAudioFormat, HcPixelFormat};
use hc_abi::host::*;
use hc_abi::raw::*;
use hc_abi::{to_cstring, ContentLoad, CoreInfo, EnvironmentInfo, HcResult, ResetType, RunState};
use hc_core::{HydraError, Result};

use crate::context::host_context;
use crate::host_functions::resolve_host_symbol;

/// Symbols every core library exports
pub const CORE_EXPORT_NAMES: [&str; 8] = [
    "hcGetCoreInfo",
    "hcCreate",
    "hcDestroy",
    "hcReset",
    "hcSetRunState",
    "hcLoadContent",
    "hcGetError",
    "hcInternalLoadFunctions",
];

/// The resolved exports of one core
#[derive(Clone, Copy)]
pub struct CoreExports {
    pub get_core_info: HcGetCoreInfoFn,
    pub create: HcCreateFn,
    pub destroy: HcDestroyFn,
    pub reset: HcResetFn,
    pub set_run_state: HcSetRunStateFn,
    pub load_content: HcLoadContentFn,
    pub get_error: HcGetErrorFn,
    pub internal_load_functions: HcInternalLoadFunctionsFn,
}

impl CoreExports {
    fn load(library: &Library) -> Result<Self> {
        // SAFETY: each symbol is read with the type the ABI gives it
        unsafe {
            Ok(Self {
                get_core_info: symbol(library, CORE_EXPORT_NAMES[0])?,
                create: symbol(library, CORE_EXPORT_NAMES[1])?,
                destroy: symbol(library, CORE_EXPORT_NAMES[2])?,
                reset: symbol(library, CORE_EXPORT_NAMES[3])?,
                set_run_state: symbol(library, CORE_EXPORT_NAMES[4])?,
                load_content: symbol(library, CORE_EXPORT_NAMES[5])?,
                get_error: symbol(library, CORE_EXPORT_NAMES[6])?,
                internal_load_functions: symbol(library, CORE_EXPORT_NAMES[7])?,
            })
        }
    }
}

unsafe fn symbol<T: Copy>(library: &Library, name: &str) -> Result<T> {
    library
        .get::<T>(name.as_bytes())
        .map(|symbol| *symbol)
        .map_err(|_| HydraError::MissingFunction(name.to_string()))
}

/// A core with its host functions loaded.
///
/// Each call converts to the raw structures, decodes the result code and, on
/// failure, attaches the core's `hcGetError` message.
pub struct CoreLibrary {
    exports: CoreExports,
    info: CoreInfo,
    path: Option<PathBuf>,
    created: bool,
    // Dropped last, the export pointers point into it
    _library: Option<Library>,
}

impl CoreLibrary {
    /// Load a core from a shared library
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading core library {}", path.display());

        // SAFETY: loading runs the library's initializers. Core libraries
        // are trusted the same way the frontend binary is.
        let library = unsafe { Library::new(path) }
            .map_err(|e| HydraError::Library(format!("{}: {}", path.display(), e)))?;
        let exports = CoreExports::load(&library)?;
        Self::init(exports, Some(library), Some(path.to_path_buf()))
    }

    /// Use a core linked into this process
    pub fn from_exports(exports: CoreExports) -> Result<Self> {
        Self::init(exports, None, None)
    }

    fn init(exports: CoreExports, library: Option<Library>, path: Option<PathBuf>) -> Result<Self> {
        let mut core = Self {
            exports,
            info: CoreInfo::default(),
            path,
            created: false,
            _library: library,
        };

        // SAFETY: `resolve_host_symbol` lives for the whole process
        let code = unsafe { (core.exports.internal_load_functions)(Some(resolve_host_symbol)) };
        core.check(code)?;

        let mut raw = HcCoreInfo::default();
        // SAFETY: the core fills `raw` with pointers into its own static storage
        core.info = unsafe {
            (core.exports.get_core_info)(&mut raw);
            CoreInfo::from_raw(&raw)?
        };
        info!(
            "Core: {} {} ({})",
            core.info.core_name, core.info.core_version, core.info.system_name
        );
        Ok(core)
    }

    pub fn core_info(&self) -> &CoreInfo {
        &self.info
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    /// The core's last error message, if it has one
    pub fn last_error(&self) -> Option<String> {
        // SAFETY: the string stays valid until the next failing call
        unsafe { hc_abi::string_from_ptr((self.exports.get_error)()) }
    }

    /// Decode a result code, taking the message body from `hcGetError`
    fn check(&self, code: HcResult) -> Result<()> {
        if code.is_success() {
            return Ok(());
        }
        let detail = self.last_error().map(|message| match message.split_once(": ") {
            Some((_, body)) => body.to_string(),
            None => message,
        });
        code.into_result(detail)
    }

    /// Create the instance and read back the environment it needs
    pub fn create(&mut self) -> Result<EnvironmentInfo> {
        host_context().acquire()?;

        let mut video = HcVideoInfo::default();
        let mut audio = HcAudioInfo::default();
        let mut raw = HcEnvironmentInfo::with_outputs(&mut video, &mut audio);

        // SAFETY: `raw` points at outputs that live across the call
        let code = unsafe { (self.exports.create)(&mut raw) };
        if let Err(err) = self.check(code) {
            host_context().release();
            return Err(err);
        }
        self.created = true;

        // Outputs the core left untouched mean no video or no audio
        if video.format == HcPixelFormat::NULL && video.width == 0 {
            raw.video = std::ptr::null_mut();
        }
        if audio.format == HcAudioFormat::NULL {
            raw.audio = std::ptr::null_mut();
        }

        // SAFETY: raw.video and raw.audio are null or point at the locals
        let environment = unsafe { EnvironmentInfo::from_raw(&raw) };
        if environment.is_err() {
            self.destroy()?;
        }
        environment
    }

    pub fn destroy(&mut self) -> Result<()> {
        if !self.created {
            return Ok(());
        }
        let info = HcDestroyInfo::default();
        // SAFETY: `info` lives across the call
        let code = unsafe { (self.exports.destroy)(&info) };
        self.created = false;
        host_context().release();
        debug!("Core destroyed");
        self.check(code)
    }

    pub fn reset(&self, reset_type: ResetType) -> Result<()> {
        let info = HcResetInfo {
            reset_type: reset_type.into(),
            ..Default::default()
        };
        // SAFETY: `info` lives across the call
        let code = unsafe { (self.exports.reset)(&info) };
        self.check(code)
    }

    pub fn set_run_state(&self, state: RunState) -> Result<()> {
        let info = HcRunStateInfo {
            run_state: state.into(),
            ..Default::default()
        };
        // SAFETY: `info` lives across the call
        let code = unsafe { (self.exports.set_run_state)(&info) };
        self.check(code)
    }

    pub fn load_content(&self, content: &ContentLoad) -> Result<()> {
        let name = to_cstring(&content.name);
        let path = CString::new(content.path.to_string_lossy().into_owned()).map_err(|_| {
            HydraError::BadContent(format!("path {} contains a nul byte", content.path.display()))
        })?;
        let info = HcContentLoadInfo {
            name: name.as_ptr(),
            path: path.as_ptr(),
            ..Default::default()
        };
        // SAFETY: both strings outlive the call
        let code = unsafe { (self.exports.load_content)(&info) };
        self.check(code)
    }
}

impl Drop for CoreLibrary {
    fn drop(&mut self) {
        if let Err(e) = self.destroy() {
            tracing::warn!("Destroying core on unload failed: {}", e);
        }
    }
}
