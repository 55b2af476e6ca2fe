//! Lock domains shared between the frontend and a running core
//!
//! State is split into three domains with one lock each: run state, video
//! and audio. Access goes through closures so a guard never outlives the
//! check or update it protects.

use std::fmt;

use parking_lot::Mutex;

use hc_abi::RunStateCell;

use crate::audio::AudioQueue;
use crate::video::FrameSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockDomain {
    RunState,
    Video,
    Audio,
}

impl fmt::Display for LockDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LockDomain::RunState => "run-state",
            LockDomain::Video => "video",
            LockDomain::Audio => "audio",
        };
        f.write_str(name)
    }
}

#[derive(Default)]
pub struct SharedState {
    run_state: RunStateCell,
    video: Mutex<FrameSink>,
    audio: Mutex<AudioQueue>,
}

impl SharedState {
    pub fn new(video: FrameSink, audio: AudioQueue) -> Self {
        Self {
            run_state: RunStateCell::new(),
            video: Mutex::new(video),
            audio: Mutex::new(audio),
        }
    }

    /// Run state cell. It carries its own lock and condition variable.
    pub fn run_state(&self) -> &RunStateCell {
        &self.run_state
    }

    pub fn with_video<R>(&self, f: impl FnOnce(&mut FrameSink) -> R) -> R {
        f(&mut self.video.lock())
    }

    pub fn with_audio<R>(&self, f: impl FnOnce(&mut AudioQueue) -> R) -> R {
        f(&mut self.audio.lock())
    }

    /// Run `f` while holding the lock of `domain` without touching its data
    pub fn with<R>(&self, domain: LockDomain, f: impl FnOnce() -> R) -> R {
        match domain {
            LockDomain::RunState => self.run_state.with(|_| f()),
            LockDomain::Video => {
                let _guard = self.video.lock();
                f()
            }
            LockDomain::Audio => {
                let _guard = self.audio.lock();
                f()
            }
        }
    }

    /// Check whether `domain` is currently locked by someone else
    pub fn is_contended(&self, domain: LockDomain) -> bool {
        match domain {
            LockDomain::RunState => self.run_state.is_locked(),
            LockDomain::Video => self.video.is_locked(),
            LockDomain::Audio => self.audio.is_locked(),
        }
    }
}
