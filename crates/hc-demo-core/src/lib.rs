//! Test pattern core
//!
//! [`TestPatternCore`] is written against the capability interfaces. The
//! [`PatternModule`] glue exposes it through the C ABI as a frontend-driven,
//! software-rendered core with stereo 16-bit audio.

pub mod pattern;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use hc_abi::enums::HcInputType;
use hc_abi::*;
use hc_core::{HydraError, Result};
use hc_interface::*;

pub use pattern::TestPatternCore;

/// Input type the host is asked for when the core checks `button`.
///
/// Types are numbered from 1 in [`ButtonType`] order, 0 being the null type.
pub fn button_input_type(button: ButtonType) -> HcInputType {
    HcInputType(button.index() as i32 + 1)
}

fn audio_info() -> AudioInfo {
    AudioInfo {
        format: AudioFormat::S16Pcm,
        channels: AudioChannels::Stereo,
        sample_rate: pattern::DEFAULT_SAMPLE_RATE,
    }
}

/// First failure reported by the host while a frame ran
type PushError = Arc<Mutex<Option<HydraError>>>;

fn record(errors: &PushError, result: Result<()>) {
    if let Err(err) = result {
        errors.lock().get_or_insert(err);
    }
}

pub struct PatternModule {
    core: TestPatternCore,
    push_error: PushError,
}

impl PatternModule {
    pub fn core(&self) -> &TestPatternCore {
        &self.core
    }

    /// Route the core's callbacks to the host functions
    fn connect(core: &mut TestPatternCore, host: &Arc<HostBindings>, errors: &PushError) {
        let video_host = Arc::clone(host);
        let video_errors = Arc::clone(errors);
        core.set_video_callback(Box::new(move |data: &[u8], size: Size| {
            let image = ImageData::packed(data, size.width, size.height, PixelFormat::Rgba32);
            record(&video_errors, video_host.push_video_frame(&image));
        }));

        let audio_host = Arc::clone(host);
        let audio_errors = Arc::clone(errors);
        core.set_audio_callback(Box::new(move |data: &[u8]| {
            let info = audio_info();
            let samples = AudioData {
                data,
                sample_count: (data.len() / info.frame_size()) as u32,
                want: info,
                have: info,
            };
            record(&audio_errors, audio_host.push_samples(&samples));
        }));

        let input_host = Arc::clone(host);
        let input_errors = Arc::clone(errors);
        core.set_check_button_callback(Box::new(move |player: u32, button: ButtonType| {
            let request = InputRequest {
                port: player,
                input_type: button_input_type(button),
            };
            match input_host.get_inputs_sync(&[request]) {
                Ok(values) => values.first().copied().unwrap_or(0) as i32,
                Err(err) => {
                    record(&input_errors, Err(err));
                    0
                }
            }
        }));
    }
}

impl CoreModule for PatternModule {
    fn core_info() -> CoreInfo {
        CoreInfo {
            core_name: "Test Pattern".to_string(),
            core_version: env!("CARGO_PKG_VERSION").to_string(),
            system_name: "Hydra Test System".to_string(),
            author: "hydra developers".to_string(),
            description: "Scrolling test pattern with a square tone".to_string(),
            website: String::new(),
            settings: String::new(),
            license: "MIT".to_string(),
            loadable_content: vec![ContentInfo {
                name: pattern::CONTENT_KIND.to_string(),
                description: "Pattern seed".to_string(),
                extensions: "pat,bin".to_string(),
            }],
            icon: Some(Icon {
                width: 2,
                height: 2,
                format: PixelFormat::Rgba32,
                data: vec![
                    0xff, 0x00, 0x00, 0xff, 0x00, 0xff, 0x00, 0xff, //
                    0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
                ],
            }),
        }
    }

    fn create(host: Arc<HostBindings>) -> Result<(Self, EnvironmentInfo)> {
        let push_error: PushError = Arc::new(Mutex::new(None));
        let mut core = TestPatternCore::new();
        core.set_sample_rate(pattern::DEFAULT_SAMPLE_RATE);
        Self::connect(&mut core, &host, &push_error);

        let size = core.native_size();
        let environment = EnvironmentInfo {
            drive_mode: DriveMode::FrontendDriven,
            video: Some(VideoInfo {
                renderer: RendererType::Software,
                renderer_version: 0,
                width: size.width,
                height: size.height,
                frame_rate: core.fps() as u32,
                format: PixelFormat::Rgba32,
            }),
            audio: Some(audio_info()),
        };
        info!("Test pattern core created at {}x{}", size.width, size.height);
        Ok((Self { core, push_error }, environment))
    }

    fn destroy(&mut self) {
        debug!("Test pattern core destroyed after {} frames", self.core.frame());
    }

    fn reset(&mut self, reset_type: ResetType) -> Result<()> {
        match reset_type {
            ResetType::Soft => self.core.reset(),
            ResetType::Hard => self.core.unload(),
        }
        Ok(())
    }

    fn load_content(&mut self, content: &ContentLoad) -> Result<()> {
        if self.core.load_file(&content.name, &content.path) {
            Ok(())
        } else {
            Err(HydraError::BadContent(format!(
                "cannot load {}",
                content.path.display()
            )))
        }
    }

    fn run_frame(&mut self) -> Result<()> {
        self.core.run_frame();
        match self.push_error.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

hc_abi::core_export!(PatternModule);
