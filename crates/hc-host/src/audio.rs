//! Audio sample queue
//!
//! Cores push interleaved sample frames with `hcPushSamples`. The queue checks
//! them against the negotiated audio format and holds them until the frontend
//! drains them.

use hc_abi::{AudioData, AudioFormat, AudioInfo, DriveMode};
use hc_core::{HydraError, Result};
use tracing::{debug, warn};

/// Default capacity in sample frames
pub const DEFAULT_CAPACITY: usize = 8192;

pub struct AudioQueue {
    /// Capacity in sample frames
    capacity: usize,
    drive_mode: Option<DriveMode>,
    negotiated: Option<AudioInfo>,
    data: Vec<u8>,
    queued: usize,
    pushes: u64,
}

impl Default for AudioQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl AudioQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            drive_mode: None,
            negotiated: None,
            data: Vec::new(),
            queued: 0,
            pushes: 0,
        }
    }

    /// Adopt the environment a core reported. Queued samples are dropped.
    pub fn configure(&mut self, drive_mode: DriveMode, audio: Option<AudioInfo>) {
        self.drive_mode = Some(drive_mode);
        self.negotiated = audio;
        self.clear();
        if let Some(audio) = audio {
            debug!(
                "Audio negotiated: {:?} {:?} @ {} Hz, capacity {} frames",
                audio.format, audio.channels, audio.sample_rate, self.capacity
            );
        }
    }

    /// Forget the environment, as after the core is destroyed
    pub fn reset(&mut self) {
        self.drive_mode = None;
        self.negotiated = None;
        self.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn negotiated(&self) -> Option<AudioInfo> {
        self.negotiated
    }

    /// Queued sample frames
    pub fn queued(&self) -> usize {
        self.queued
    }

    pub fn pushes(&self) -> u64 {
        self.pushes
    }

    /// Queue one push.
    ///
    /// `want` is already known to be a valid format by the time it is parsed.
    /// `have` has to match what the core negotiated at creation, and the push
    /// must fit the remaining capacity. A rejected push queues nothing.
    pub fn push(&mut self, data: &AudioData<'_>) -> Result<()> {
        if let Some(mode) = self.drive_mode {
            if !mode.accepts_pushed_audio() {
                return Err(HydraError::AudioFullySelfDriven);
            }
        }

        let negotiated = self.negotiated.ok_or_else(|| {
            HydraError::BadAudioDataHave("core did not negotiate audio output".to_string())
        })?;
        if data.have != negotiated {
            return Err(HydraError::BadAudioDataHave(format!(
                "{:?} {:?} @ {} Hz does not match negotiated {:?} {:?} @ {} Hz",
                data.have.format,
                data.have.channels,
                data.have.sample_rate,
                negotiated.format,
                negotiated.channels,
                negotiated.sample_rate
            )));
        }

        let pushed = data.sample_count as usize;
        if self.queued + pushed > self.capacity {
            warn!(
                "Audio overrun: {} queued, {} pushed, capacity {}",
                self.queued, pushed, self.capacity
            );
            return Err(HydraError::AudioOverrun {
                queued: self.queued,
                pushed,
                capacity: self.capacity,
            });
        }

        let len = pushed * data.have.frame_size();
        self.data.extend_from_slice(&data.data[..len.min(data.data.len())]);
        self.queued += pushed;
        self.pushes += 1;
        Ok(())
    }

    /// Take every queued byte
    pub fn drain(&mut self) -> Vec<u8> {
        self.queued = 0;
        std::mem::take(&mut self.data)
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.queued = 0;
    }

    /// Largest absolute sample value queued, for signed 16-bit audio only
    pub fn peak_s16(&self) -> Option<u16> {
        if self.negotiated?.format != AudioFormat::S16Pcm {
            return None;
        }
        self.data
            .chunks_exact(2)
            .map(|chunk| bytemuck::pod_read_unaligned::<i16>(chunk).unsigned_abs())
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hc_abi::AudioChannels;

    fn stereo() -> AudioInfo {
        AudioInfo {
            format: AudioFormat::S16Pcm,
            channels: AudioChannels::Stereo,
            sample_rate: 48000,
        }
    }

    fn data(bytes: &[u8], have: AudioInfo) -> AudioData<'_> {
        AudioData {
            data: bytes,
            sample_count: (bytes.len() / have.frame_size()) as u32,
            want: stereo(),
            have,
        }
    }

    #[test]
    fn test_push_and_drain() {
        let mut queue = AudioQueue::new(16);
        queue.configure(DriveMode::FrontendDriven, Some(stereo()));

        let samples: Vec<u8> = bytemuck::cast_slice(&[100i16, -300, 7, 8]).to_vec();
        queue.push(&data(&samples, stereo())).unwrap();
        assert_eq!(queue.queued(), 2);
        assert_eq!(queue.peak_s16(), Some(300));

        assert_eq!(queue.drain(), samples);
        assert_eq!(queue.queued(), 0);
        assert_eq!(queue.pushes(), 1);
    }

    #[test]
    fn test_have_must_match() {
        let mut queue = AudioQueue::new(16);
        queue.configure(DriveMode::FrontendDriven, Some(stereo()));

        let mono = AudioInfo {
            channels: AudioChannels::Mono,
            ..stereo()
        };
        let err = queue.push(&data(&[0; 4], mono)).unwrap_err();
        assert!(matches!(err, HydraError::BadAudioDataHave(_)));
        assert_eq!(queue.queued(), 0);
    }

    #[test]
    fn test_no_negotiated_audio() {
        let mut queue = AudioQueue::new(16);
        queue.configure(DriveMode::FrontendDriven, None);
        let err = queue.push(&data(&[0; 4], stereo())).unwrap_err();
        assert!(matches!(err, HydraError::BadAudioDataHave(_)));
    }

    #[test]
    fn test_fully_self_driven_rejects() {
        let mut queue = AudioQueue::new(16);
        queue.configure(DriveMode::SelfDriven, Some(stereo()));
        let err = queue.push(&data(&[0; 4], stereo())).unwrap_err();
        assert!(matches!(err, HydraError::AudioFullySelfDriven));

        queue.configure(DriveMode::SelfDrivenExceptAudio, Some(stereo()));
        queue.push(&data(&[0; 4], stereo())).unwrap();
    }

    #[test]
    fn test_overrun() {
        let mut queue = AudioQueue::new(3);
        queue.configure(DriveMode::FrontendDriven, Some(stereo()));
        queue.push(&data(&[0; 8], stereo())).unwrap();

        let err = queue.push(&data(&[0; 8], stereo())).unwrap_err();
        match err {
            HydraError::AudioOverrun {
                queued,
                pushed,
                capacity,
            } => assert_eq!((queued, pushed, capacity), (2, 2, 3)),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(queue.queued(), 2);
    }

    #[test]
    fn test_peak_only_for_s16() {
        let mut queue = AudioQueue::default();
        assert_eq!(queue.capacity(), DEFAULT_CAPACITY);
        let float = AudioInfo {
            format: AudioFormat::Float32,
            ..stereo()
        };
        queue.configure(DriveMode::FrontendDriven, Some(float));
        assert_eq!(queue.peak_s16(), None);
    }
}
