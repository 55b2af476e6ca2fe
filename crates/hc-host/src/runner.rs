//! Drives one core instance through its lifecycle
//!
//! create -> load content -> run-state changes -> frames -> quit -> destroy.
//! Frontend-driven cores run a frame per [`CoreRunner::run_frame`] call;
//! self-driven cores get a thread of their own that enters the core's entry
//! point and returns once the run state reaches `Quit`.

use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use hc_abi::enums::HcInputType;
use hc_abi::{ContentLoad, DriveMode, EnvironmentInfo, ResetType, RunState};
use hc_core::{Config, HydraError, Result};

use crate::context::host_context;
use crate::library::CoreLibrary;
use crate::video::Frame;

pub struct CoreRunner {
    library: CoreLibrary,
    environment: EnvironmentInfo,
    config: Config,
    core_thread: Option<JoinHandle<()>>,
    frame_count: u64,
    frame_interval: Option<Duration>,
}

impl CoreRunner {
    /// Create the core and adopt its environment
    pub fn new(mut library: CoreLibrary, config: &Config) -> Result<Self> {
        let context = host_context();
        if context.is_active() {
            return Err(HydraError::TooManyInstances { limit: 1 });
        }
        context.configure(config);

        let environment = library.create()?;
        if let Err(err) = context.establish(environment) {
            warn!("Core environment rejected: {}", err);
            library.destroy()?;
            return Err(err);
        }

        let frame_interval = environment
            .video
            .map(|video| video.frame_rate.min(config.video.max_frame_rate))
            .filter(|rate| *rate > 0)
            .map(|rate| Duration::from_secs_f64(1.0 / rate as f64));

        info!(
            "Runner ready: {:?}, frame interval {:?}",
            environment.drive_mode, frame_interval
        );
        Ok(Self {
            library,
            environment,
            config: config.clone(),
            core_thread: None,
            frame_count: 0,
            frame_interval,
        })
    }

    pub fn library(&self) -> &CoreLibrary {
        &self.library
    }

    pub fn environment(&self) -> &EnvironmentInfo {
        &self.environment
    }

    pub fn run_state(&self) -> RunState {
        host_context().shared().run_state().get()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Target time per frame, the core's rate capped by the configuration
    pub fn frame_interval(&self) -> Option<Duration> {
        self.frame_interval
    }

    /// Load `path` as the first content kind whose extensions match it
    pub fn load_content(&self, path: &Path) -> Result<()> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        let kind = self
            .library
            .core_info()
            .loadable_content
            .iter()
            .find(|content| content.matches_extension(ext))
            .ok_or_else(|| {
                HydraError::BadContent(format!("no content kind accepts {}", path.display()))
            })?;

        info!("Loading {} as {}", path.display(), kind.name);
        self.library.load_content(&ContentLoad {
            name: kind.name.clone(),
            path: path.to_path_buf(),
        })
    }

    /// Request a run-state change from the core and mirror it on success
    fn set_run_state(&self, state: RunState) -> Result<()> {
        let cell = host_context().shared().run_state();
        cell.get().transition(state)?;
        self.library.set_run_state(state)?;
        cell.set(state)?;
        Ok(())
    }

    /// Enter the configured initial run state and start a self-driven core
    pub fn start(&mut self) -> Result<()> {
        let initial = if self.config.general.start_paused {
            RunState::Paused
        } else {
            RunState::Running
        };
        self.set_run_state(initial)?;

        if self.environment.drive_mode != DriveMode::FrontendDriven && self.core_thread.is_none() {
            let entry_point = host_context()
                .callbacks()
                .entry_point
                .ok_or(HydraError::NotAllCallbacksSet)?;
            let handle = thread::Builder::new()
                .name("hydra-core".to_string())
                // SAFETY: the entry point returns once the core reaches Quit
                .spawn(move || unsafe { entry_point() })?;
            self.core_thread = Some(handle);
            debug!("Self-driven core thread started");
        }
        Ok(())
    }

    pub fn pause(&self) -> Result<()> {
        self.set_run_state(RunState::Paused)
    }

    pub fn resume(&self) -> Result<()> {
        self.set_run_state(RunState::Running)
    }

    pub fn reset(&mut self, reset_type: ResetType) -> Result<()> {
        self.library.reset(reset_type)?;
        host_context().shared().with_audio(|queue| queue.clear());
        self.frame_count = 0;
        Ok(())
    }

    /// Run one frame of a frontend-driven core. Returns false when the core
    /// is not running.
    pub fn run_frame(&mut self) -> Result<bool> {
        if self.environment.drive_mode != DriveMode::FrontendDriven {
            return Err(HydraError::WrongDriveMode(
                "self-driven cores run on their own thread".to_string(),
            ));
        }
        if self.run_state() != RunState::Running {
            return Ok(false);
        }

        let run_frame = host_context()
            .callbacks()
            .run_frame
            .ok_or(HydraError::NotAllCallbacksSet)?;
        // SAFETY: registered by the core for exactly this purpose
        unsafe { run_frame() };
        self.frame_count += 1;

        if !self.config.audio.enable {
            self.drain_audio();
        }
        Ok(true)
    }

    /// Run `count` frames, paced to the frame interval when `paced` is set.
    /// A self-driven core runs on its own while this waits.
    pub fn run_frames(&mut self, count: u64, paced: bool) -> Result<u64> {
        let interval = self.frame_interval.filter(|_| paced);

        if self.environment.drive_mode != DriveMode::FrontendDriven {
            let before = self.frames_received();
            let wait = self.frame_interval.unwrap_or(Duration::from_millis(16));
            thread::sleep(wait * count as u32);
            return Ok(self.frames_received() - before);
        }

        let mut ran = 0;
        for _ in 0..count {
            let started = Instant::now();
            if !self.run_frame()? {
                break;
            }
            ran += 1;
            if let Some(interval) = interval {
                if let Some(remaining) = interval.checked_sub(started.elapsed()) {
                    thread::sleep(remaining);
                }
            }
        }
        Ok(ran)
    }

    pub fn frames_received(&self) -> u64 {
        host_context()
            .shared()
            .with_video(|sink| sink.frames_received())
    }

    pub fn latest_frame(&self) -> Option<Frame> {
        host_context()
            .shared()
            .with_video(|sink| sink.latest().cloned())
    }

    pub fn drain_audio(&self) -> Vec<u8> {
        host_context().shared().with_audio(|queue| queue.drain())
    }

    pub fn set_input(&self, port: u32, input_type: HcInputType, value: i64) -> Result<()> {
        host_context().with_input_mut(|input| input.set(port, input_type, value))
    }

    /// Move to `Quit`, wait for a self-driven core to return and destroy it
    pub fn quit(&mut self) -> Result<()> {
        if !self.library.is_created() {
            return Ok(());
        }
        let mut destroyed = None;
        if self.run_state() != RunState::Quit {
            if let Err(e) = self.set_run_state(RunState::Quit) {
                // Destroying forces the core's own run state to Quit
                warn!("Core refused to quit: {}", e);
                destroyed = Some(self.library.destroy());
            }
        }
        if let Some(handle) = self.core_thread.take() {
            if handle.join().is_err() {
                warn!("Core thread panicked");
            }
        }
        info!("Core quit after {} frames", self.frame_count);
        match destroyed {
            Some(result) => result,
            None => self.library.destroy(),
        }
    }
}

impl Drop for CoreRunner {
    fn drop(&mut self) {
        if let Err(e) = self.quit() {
            warn!("Quitting core failed: {}", e);
        }
    }
}
