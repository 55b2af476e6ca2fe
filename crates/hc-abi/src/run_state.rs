//! Shared run state
//!
//! The frontend requests transitions from its thread while a self-driven core
//! waits on the state from its own. The guard is held only to check or update
//! the state, never while a core does work.

use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use hc_core::Result;

use crate::model::RunState;

pub struct RunStateCell {
    state: Mutex<RunState>,
    changed: Condvar,
}

impl Default for RunStateCell {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStateCell {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RunState::Null),
            changed: Condvar::new(),
        }
    }

    pub fn get(&self) -> RunState {
        *self.state.lock()
    }

    /// Apply a validated transition and wake waiters. Returns the previous state.
    pub fn set(&self, next: RunState) -> Result<RunState> {
        let mut state = self.state.lock();
        let previous = *state;
        *state = previous.transition(next)?;
        drop(state);

        if previous != next {
            debug!("Run state {} -> {}", previous.name(), next.name());
            self.changed.notify_all();
        }
        Ok(previous)
    }

    /// Run `f` with the current state while holding the lock
    pub fn with<R>(&self, f: impl FnOnce(RunState) -> R) -> R {
        let state = self.state.lock();
        f(*state)
    }

    pub fn is_locked(&self) -> bool {
        self.state.is_locked()
    }

    /// Return to `Null` for a fresh instance, regardless of the current state
    pub fn clear(&self) {
        *self.state.lock() = RunState::Null;
        self.changed.notify_all();
    }

    /// Block while the state is `Null` or `Paused`. Returns the state that
    /// ended the wait, `Running` or `Quit`.
    pub fn wait_runnable(&self) -> RunState {
        let mut state = self.state.lock();
        while matches!(*state, RunState::Null | RunState::Paused) {
            self.changed.wait(&mut state);
        }
        *state
    }

    /// As [`Self::wait_runnable`], but gives up after `timeout` and returns
    /// the state at that point.
    pub fn wait_runnable_for(&self, timeout: Duration) -> RunState {
        let mut state = self.state.lock();
        if matches!(*state, RunState::Null | RunState::Paused) {
            self.changed.wait_for(&mut state, timeout);
        }
        *state
    }

    /// Block until the state is `Quit`
    pub fn wait_quit(&self) {
        let mut state = self.state.lock();
        while *state != RunState::Quit {
            self.changed.wait(&mut state);
        }
    }
}
