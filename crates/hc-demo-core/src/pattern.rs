//! A core that draws a scrolling test pattern and plays a square tone
//!
//! Content is a seed file: the sum of its bytes shifts the pattern. Holding
//! `A` on player one inverts the colors.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use hc_interface::*;
use tracing::{debug, warn};

pub const NATIVE_SIZE: Size = Size::new(160, 120);
pub const FPS: u16 = 60;
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;
/// Content kind name accepted by [`IBase::load_file`]
pub const CONTENT_KIND: &str = "pattern";

const TONE_HZ: u32 = 440;
const TONE_AMPLITUDE: i16 = 4096;
const STATE_LEN: usize = 9;
const MAX_REWIND_FRAMES: u32 = 600;

/// State restored by save states and rewind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Snapshot {
    frame: u32,
    seed: u32,
    inverted: bool,
}

impl Snapshot {
    fn to_bytes(self) -> Vec<u8> {
        let mut data = Vec::with_capacity(STATE_LEN);
        data.extend_from_slice(&self.frame.to_le_bytes());
        data.extend_from_slice(&self.seed.to_le_bytes());
        data.push(self.inverted as u8);
        data
    }

    fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() != STATE_LEN {
            return None;
        }
        let frame = u32::from_le_bytes(data[0..4].try_into().ok()?);
        let seed = u32::from_le_bytes(data[4..8].try_into().ok()?);
        Some(Self {
            frame,
            seed,
            inverted: data[8] != 0,
        })
    }
}

pub struct TestPatternCore {
    state: Snapshot,
    content: Option<PathBuf>,
    output_size: Size,
    sample_rate: u32,
    tone_phase: u32,
    pixels: Vec<u8>,
    history: VecDeque<Snapshot>,
    rewind_frames: u32,
    video_callback: Option<VideoCallback>,
    audio_callback: Option<AudioCallback>,
    poll_input: Option<PollInputCallback>,
    check_button: Option<CheckButtonCallback>,
}

impl Default for TestPatternCore {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPatternCore {
    pub fn new() -> Self {
        Self {
            state: Snapshot::default(),
            content: None,
            output_size: NATIVE_SIZE,
            sample_rate: DEFAULT_SAMPLE_RATE,
            tone_phase: 0,
            pixels: vec![0; NATIVE_SIZE.area() * 4],
            history: VecDeque::new(),
            rewind_frames: 60,
            video_callback: None,
            audio_callback: None,
            poll_input: None,
            check_button: None,
        }
    }

    pub fn frame(&self) -> u32 {
        self.state.frame
    }

    pub fn seed(&self) -> u32 {
        self.state.seed
    }

    pub fn content(&self) -> Option<&Path> {
        self.content.as_deref()
    }

    /// Size the frontend scales frames to. Frames are always rendered at
    /// [`NATIVE_SIZE`].
    pub fn output_size(&self) -> Size {
        self.output_size
    }

    pub fn is_inverted(&self) -> bool {
        self.state.inverted
    }

    /// Forget loaded content along with the frame state
    pub fn unload(&mut self) {
        self.content = None;
        self.reset();
    }

    fn read_input(&mut self) {
        if let Some(poll) = self.poll_input.as_mut() {
            poll();
        }
        if let Some(check) = self.check_button.as_mut() {
            self.state.inverted = check(0, ButtonType::A) != 0;
        }
    }

    fn render(&mut self) {
        let Size { width, height } = NATIVE_SIZE;
        let shift = self.state.frame.wrapping_add(self.state.seed);
        for y in 0..height {
            for x in 0..width {
                let i = ((y * width + x) * 4) as usize;
                let mut pixel = [
                    (x.wrapping_add(shift) % 256) as u8,
                    (y.wrapping_add(shift) % 256) as u8,
                    (shift % 256) as u8,
                    0xff,
                ];
                if self.state.inverted {
                    for channel in &mut pixel[..3] {
                        *channel = !*channel;
                    }
                }
                self.pixels[i..i + 4].copy_from_slice(&pixel);
            }
        }
        if let Some(callback) = self.video_callback.as_mut() {
            callback(&self.pixels, NATIVE_SIZE);
        }
    }

    /// One frame of interleaved stereo S16 samples
    fn tone(&mut self) -> Vec<i16> {
        let frames = self.sample_rate / FPS as u32;
        let period = (self.sample_rate / TONE_HZ).max(2);
        let mut samples = Vec::with_capacity(frames as usize * 2);
        for _ in 0..frames {
            let value = if self.tone_phase < period / 2 {
                TONE_AMPLITUDE
            } else {
                -TONE_AMPLITUDE
            };
            samples.push(value);
            samples.push(value);
            self.tone_phase = (self.tone_phase + 1) % period;
        }
        samples
    }

    fn record_history(&mut self) {
        if self.rewind_frames == 0 {
            return;
        }
        self.history.push_back(self.state);
        while self.history.len() > self.rewind_frames as usize {
            self.history.pop_front();
        }
    }
}

impl IBase for TestPatternCore {
    fn load_file(&mut self, content_type: &str, path: &Path) -> bool {
        if content_type != CONTENT_KIND {
            warn!("Unknown content type {}", content_type);
            return false;
        }
        match std::fs::read(path) {
            Ok(bytes) => {
                let seed = bytes.iter().fold(0u32, |acc, b| acc.wrapping_add(*b as u32));
                debug!("Loaded {} ({} bytes, seed {})", path.display(), bytes.len(), seed);
                self.content = Some(path.to_path_buf());
                self.reset();
                self.state.seed = seed;
                true
            }
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                false
            }
        }
    }

    fn reset(&mut self) {
        let seed = self.state.seed;
        self.state = Snapshot {
            seed,
            ..Snapshot::default()
        };
        self.tone_phase = 0;
        self.history.clear();
    }

    fn native_size(&self) -> Size {
        NATIVE_SIZE
    }

    fn set_output_size(&mut self, size: Size) {
        self.output_size = size;
    }
}

impl IFrontendDriven for TestPatternCore {
    fn run_frame(&mut self) {
        self.record_history();
        self.read_input();
        self.render();

        let samples = self.tone();
        if let Some(callback) = self.audio_callback.as_mut() {
            callback(bytemuck::cast_slice(&samples));
        }
        self.state.frame = self.state.frame.wrapping_add(1);
    }

    fn fps(&self) -> u16 {
        FPS
    }
}

impl ISoftwareRendered for TestPatternCore {
    fn set_video_callback(&mut self, callback: VideoCallback) {
        self.video_callback = Some(callback);
    }
}

impl IAudio for TestPatternCore {
    fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate.max(TONE_HZ * 2);
    }

    fn set_audio_callback(&mut self, callback: AudioCallback) {
        self.audio_callback = Some(callback);
    }
}

impl IInput for TestPatternCore {
    fn set_poll_input_callback(&mut self, callback: PollInputCallback) {
        self.poll_input = Some(callback);
    }

    fn set_check_button_callback(&mut self, callback: CheckButtonCallback) {
        self.check_button = Some(callback);
    }
}

impl ISaveState for TestPatternCore {
    fn save_state(&mut self) -> SaveState {
        SaveState::new(self.state.to_bytes())
    }

    fn load_state(&mut self, state: SaveState) -> bool {
        match Snapshot::from_bytes(&state.data) {
            Some(snapshot) => {
                self.state = snapshot;
                self.history.clear();
                true
            }
            None => false,
        }
    }
}

impl IRewind for TestPatternCore {
    fn rewind_frame(&mut self) {
        if let Some(snapshot) = self.history.pop_back() {
            self.state = snapshot;
        }
    }

    fn rewind_frame_count(&self) -> u32 {
        self.rewind_frames
    }

    fn set_rewind_frame_count(&mut self, count: u32) -> bool {
        if count > MAX_REWIND_FRAMES {
            return false;
        }
        self.rewind_frames = count;
        while self.history.len() > count as usize {
            self.history.pop_front();
        }
        true
    }
}

hydra_class!(
    TestPatternCore: IFrontendDriven,
    ISoftwareRendered,
    IAudio,
    IInput,
    ISaveState,
    IRewind
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_registered_interfaces() {
        let core = TestPatternCore::new();
        let expected = [
            InterfaceType::IBase,
            InterfaceType::IFrontendDriven,
            InterfaceType::ISoftwareRendered,
            InterfaceType::IAudio,
            InterfaceType::IInput,
            InterfaceType::ISaveState,
            InterfaceType::IRewind,
        ];
        for kind in InterfaceType::ALL {
            assert_eq!(core.has_interface(kind), expected.contains(&kind), "{}", kind.name());
        }
    }

    #[test]
    fn test_frame_output() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let audio = Arc::new(Mutex::new(0usize));

        let mut core = TestPatternCore::new();
        let sink = Arc::clone(&frames);
        core.as_software_rendered()
            .unwrap()
            .set_video_callback(Box::new(move |data: &[u8], size: Size| {
                sink.lock().unwrap().push((data.len(), size));
            }));
        let bytes = Arc::clone(&audio);
        core.as_audio()
            .unwrap()
            .set_audio_callback(Box::new(move |data: &[u8]| {
                *bytes.lock().unwrap() += data.len();
            }));

        core.as_frontend_driven().unwrap().run_frame();
        assert_eq!(core.frame(), 1);
        assert_eq!(*frames.lock().unwrap(), vec![(160 * 120 * 4, NATIVE_SIZE)]);
        // 800 stereo frames of 16-bit samples
        assert_eq!(*audio.lock().unwrap(), 800 * 4);
    }

    #[test]
    fn test_button_inverts() {
        let mut core = TestPatternCore::new();
        core.set_check_button_callback(Box::new(|player, button| {
            (player == 0 && button == ButtonType::A) as i32
        }));
        core.run_frame();
        assert!(core.is_inverted());
        assert_eq!(&core.pixels[..4], &[0xffu8; 4][..]);
    }

    #[test]
    fn test_save_and_load_state() {
        let mut core = TestPatternCore::new();
        for _ in 0..3 {
            core.run_frame();
        }
        let state = core.save_state();
        assert_eq!(state.len(), STATE_LEN);

        core.run_frame();
        assert!(core.load_state(state));
        assert_eq!(core.frame(), 3);
        assert!(!core.load_state(SaveState::new(vec![1, 2])));
    }

    #[test]
    fn test_rewind() {
        let mut core = TestPatternCore::new();
        assert!(core.set_rewind_frame_count(2));
        assert!(!core.set_rewind_frame_count(MAX_REWIND_FRAMES + 1));
        for _ in 0..5 {
            core.run_frame();
        }
        core.rewind_frame();
        assert_eq!(core.frame(), 4);
        core.rewind_frame();
        assert_eq!(core.frame(), 3);
        // History holds only two frames
        core.rewind_frame();
        assert_eq!(core.frame(), 3);
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.pat");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let mut core = TestPatternCore::new();
        assert!(core.load_file(CONTENT_KIND, &path));
        assert_eq!(core.seed(), 6);
        assert_eq!(core.content(), Some(path.as_path()));
        assert!(!core.load_file("cartridge", &path));
        assert!(!core.load_file(CONTENT_KIND, &dir.path().join("missing.pat")));

        core.unload();
        assert!(core.content().is_none());
    }
}
