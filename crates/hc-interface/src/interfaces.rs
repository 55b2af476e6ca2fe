//! The base interface and the optional mixins

use std::ffi::c_void;
use std::path::Path;

use crate::class::HydraClass;
use crate::types::*;

pub type UiRefreshCallback = Box<dyn FnMut() + Send>;
/// Receives a finished frame and its dimensions
pub type VideoCallback = Box<dyn FnMut(&[u8], Size) + Send>;
/// Receives interleaved samples as raw bytes
pub type AudioCallback = Box<dyn FnMut(&[u8]) + Send>;
pub type PollInputCallback = Box<dyn FnMut() + Send>;
/// Returns the state of `button` for `player`
pub type CheckButtonCallback = Box<dyn FnMut(u32, ButtonType) -> i32 + Send>;
pub type LogCallback = Box<dyn FnMut(&str) + Send>;

/// Implemented by every core.
///
/// Registration through [`hydra_class!`](crate::hydra_class) is required, as
/// [`HydraClass`] is a supertrait.
pub trait IBase: HydraClass {
    /// Load `path` as content of kind `content_type`
    fn load_file(&mut self, content_type: &str, path: &Path) -> bool;
    fn reset(&mut self);
    fn native_size(&self) -> Size;
    fn set_output_size(&mut self, size: Size);
}

/// The frontend calls [`IFrontendDriven::run_frame`] once per frame
pub trait IFrontendDriven {
    fn run_frame(&mut self);
    fn fps(&self) -> u16;
}

/// The core runs its own loop
pub trait ISelfDriven {
    fn run_loop(&mut self);
    fn set_ui_refresh_callback(&mut self, callback: UiRefreshCallback);
}

pub trait ISoftwareRendered {
    fn set_video_callback(&mut self, callback: VideoCallback);
}

pub trait IOpenGlRendered {
    fn set_fbo(&mut self, handle: u32);
    fn set_context(&mut self, context: *mut c_void);
    fn set_get_proc_address(&mut self, function: *mut c_void);
}

pub trait IAudio {
    fn sample_type(&self) -> SampleType {
        SampleType::Int16
    }

    fn channel_type(&self) -> ChannelType {
        ChannelType::Stereo
    }

    fn set_sample_rate(&mut self, sample_rate: u32);
    fn set_audio_callback(&mut self, callback: AudioCallback);
}

pub trait IInput {
    fn set_poll_input_callback(&mut self, callback: PollInputCallback);
    fn set_check_button_callback(&mut self, callback: CheckButtonCallback);
}

pub trait ISaveState {
    fn save_state(&mut self) -> SaveState;
    fn load_state(&mut self, state: SaveState) -> bool;
}

pub trait IMultiplayer {
    fn activate_player(&mut self, player: u32);
    fn deactivate_player(&mut self, player: u32);
    fn minimum_player_count(&self) -> u32;
    fn maximum_player_count(&self) -> u32;
}

pub trait ILog {
    fn set_log_callback(&mut self, target: LogTarget, callback: LogCallback);
}

/// Lets the frontend read guest memory, eg. for debugging or achievements
pub trait IReadableMemory {
    /// Fill `buffer` with the bytes starting at `address`
    fn read_memory(&mut self, address: u32, buffer: &mut [u8]);
}

pub trait IRewind {
    fn rewind_frame(&mut self);
    fn rewind_frame_count(&self) -> u32;
    /// `false` when the count was not accepted
    fn set_rewind_frame_count(&mut self, count: u32) -> bool;
}

pub trait ICheat {
    /// Returns the id of the new cheat
    fn add_cheat(&mut self, code: &str) -> u32;
    fn remove_cheat(&mut self, id: u32);
    fn enable_cheat(&mut self, id: u32);
    fn disable_cheat(&mut self, id: u32);
}
