//! Process-wide host state
//!
//! Host functions are plain C function pointers handed to a core, so they
//! carry no user data. Everything they need lives in [`HOST_CONTEXT`].

use std::ffi::CString;
use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use hc_abi::raw::HcHostInfo;
use hc_abi::{to_cstring, EnvironmentInfo, HostInfo};
use hc_core::{Config, HydraError, Result};

use crate::audio::AudioQueue;
use crate::callbacks::RegisteredCallbacks;
use crate::input::InputState;
use crate::sync::SharedState;

/// Global host context
pub static HOST_CONTEXT: Lazy<HostContext> = Lazy::new(HostContext::new);

pub fn host_context() -> &'static HostContext {
    &HOST_CONTEXT
}

/// Host info plus the C string its raw form points at
struct HostInfoCell {
    info: HostInfo,
    gpu_vendor: Option<CString>,
}

impl HostInfoCell {
    fn new(info: HostInfo) -> Self {
        let gpu_vendor = info.gpu_vendor.as_deref().map(to_cstring);
        Self { info, gpu_vendor }
    }
}

pub struct HostContext {
    host_info: RwLock<HostInfoCell>,
    environment: RwLock<Option<EnvironmentInfo>>,
    input: RwLock<InputState>,
    callbacks: Mutex<RegisteredCallbacks>,
    shared: SharedState,
    /// Set while a core instance exists
    active: AtomicBool,
    trace_chains: AtomicBool,
}

impl HostContext {
    fn new() -> Self {
        // SAFETY: `current()` leaves `gpu_vendor` null
        let info = unsafe { HostInfo::from_raw(&HcHostInfo::current()) };
        Self {
            host_info: RwLock::new(HostInfoCell::new(info)),
            environment: RwLock::new(None),
            input: RwLock::new(InputState::default()),
            callbacks: Mutex::new(RegisteredCallbacks::default()),
            shared: SharedState::default(),
            active: AtomicBool::new(false),
            trace_chains: AtomicBool::new(false),
        }
    }

    /// Apply frontend configuration. Takes effect for the next core instance.
    pub fn configure(&self, config: &Config) {
        self.input.write().set_ports(config.input.ports);
        self.shared
            .with_audio(|queue| *queue = AudioQueue::new(config.audio.buffer_samples));
        self.trace_chains
            .store(config.debug.trace_chains, Ordering::Relaxed);
        debug!(
            "Host configured: {} input ports, {} audio frames",
            config.input.ports, config.audio.buffer_samples
        );
    }

    /// Claim the single instance slot
    pub fn acquire(&self) -> Result<()> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| HydraError::TooManyInstances { limit: 1 })
    }

    /// Forget the instance and everything it negotiated
    pub fn release(&self) {
        *self.environment.write() = None;
        *self.callbacks.lock() = RegisteredCallbacks::default();
        self.shared.with_video(|sink| sink.reset());
        self.shared.with_audio(|queue| queue.reset());
        self.shared.run_state().clear();
        self.input.write().clear();
        self.active.store(false, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn host_info(&self) -> HostInfo {
        self.host_info.read().info.clone()
    }

    pub fn set_host_info(&self, info: HostInfo) {
        *self.host_info.write() = HostInfoCell::new(info);
    }

    /// Fill a raw host info, keeping its `next` pointer. The vendor string
    /// stays valid until the host info is replaced.
    pub fn write_host_info(&self, out: &mut HcHostInfo) {
        let cell = self.host_info.read();
        let info = &cell.info;
        out.architecture = info.architecture;
        out.operating_system = info.operating_system;
        out.gpu_vendor = cell
            .gpu_vendor
            .as_ref()
            .map_or(std::ptr::null(), |vendor| vendor.as_ptr());
        out.open_gl_version = info.open_gl_version;
        out.open_gl_es_version = info.open_gl_es_version;
        out.web_gl_version = info.web_gl_version;
        out.vulkan_version = info.vulkan_version;
        out.metal_version = info.metal_version;
        out.direct3d_version = info.direct3d_version;
    }

    pub fn environment(&self) -> Option<EnvironmentInfo> {
        *self.environment.read()
    }

    /// Adopt the environment a core reported from `hcCreate` and check the
    /// callbacks it registered meanwhile.
    pub fn establish(&self, environment: EnvironmentInfo) -> Result<()> {
        let host = self.host_info();
        if let Some(video) = environment.video {
            if !host.supports(video.renderer) {
                return Err(HydraError::BadRendererVersion(format!(
                    "host does not provide {:?}",
                    video.renderer
                )));
            }
        }

        *self.environment.write() = Some(environment);
        self.shared.with_video(|sink| sink.configure(environment.video));
        self.shared
            .with_audio(|queue| queue.configure(environment.drive_mode, environment.audio));
        info!("Core environment: {:?}", environment.drive_mode);

        self.callbacks.lock().check(environment.drive_mode)
    }

    /// Apply `hcReconfigureEnvironment`. The drive mode is fixed for the
    /// lifetime of an instance.
    pub fn reconfigure(&self, environment: EnvironmentInfo) -> Result<()> {
        let current = self.environment().ok_or_else(|| {
            HydraError::BadEnvironmentInfo("no core environment established".to_string())
        })?;
        if current.drive_mode != environment.drive_mode {
            return Err(HydraError::WrongDriveMode(format!(
                "drive mode is fixed at {:?}",
                current.drive_mode
            )));
        }

        *self.environment.write() = Some(environment);
        self.shared.with_video(|sink| sink.configure(environment.video));
        self.shared
            .with_audio(|queue| queue.configure(environment.drive_mode, environment.audio));
        debug!("Core environment reconfigured");
        Ok(())
    }

    /// Record callbacks from `hcSetCallbacks`. They are checked against the
    /// drive mode as soon as it is known.
    pub fn register_callbacks(&self, registered: RegisteredCallbacks) -> Result<()> {
        let mut callbacks = self.callbacks.lock();
        let mut merged = *callbacks;
        merged.merge(registered);
        if let Some(environment) = self.environment() {
            merged.check(environment.drive_mode)?;
        }
        *callbacks = merged;
        Ok(())
    }

    pub fn callbacks(&self) -> RegisteredCallbacks {
        *self.callbacks.lock()
    }

    pub fn with_input<R>(&self, f: impl FnOnce(&InputState) -> R) -> R {
        f(&self.input.read())
    }

    pub fn with_input_mut<R>(&self, f: impl FnOnce(&mut InputState) -> R) -> R {
        f(&mut self.input.write())
    }

    pub fn shared(&self) -> &SharedState {
        &self.shared
    }

    pub fn trace_chains(&self) -> bool {
        self.trace_chains.load(Ordering::Relaxed)
    }
}
