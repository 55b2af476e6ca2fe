//! Callbacks registered by a core through `hcSetCallbacks`

use hc_abi::enums::HcStructureType;
use hc_abi::raw::{HcCallbacks, HcVoidCallback};
use hc_abi::DriveMode;
use hc_core::{HydraError, Result};

/// Registrations accumulate, a later call replaces only what it sets
#[derive(Debug, Clone, Copy, Default)]
pub struct RegisteredCallbacks {
    pub run_frame: Option<HcVoidCallback>,
    pub entry_point: Option<HcVoidCallback>,
}

impl RegisteredCallbacks {
    /// Read a raw `HcCallbacks` and its nested structures.
    ///
    /// # Safety
    /// The nested pointers must be null or point to valid structures.
    pub unsafe fn from_raw(raw: &HcCallbacks) -> Result<Self> {
        if raw.ty != HcStructureType::CALLBACKS {
            return Err(HydraError::Core(format!(
                "expected callbacks structure, got {:?}",
                raw.ty
            )));
        }

        let mut callbacks = Self::default();
        if let Some(frontend) = raw.frontend_driven_callbacks.as_ref() {
            callbacks.run_frame = frontend.run_frame;
        }
        if let Some(self_driven) = raw.self_driven_callbacks.as_ref() {
            callbacks.entry_point = self_driven.entry_point;
        }
        if callbacks.is_empty() {
            return Err(HydraError::NotAllCallbacksSet);
        }
        Ok(callbacks)
    }

    pub fn is_empty(&self) -> bool {
        self.run_frame.is_none() && self.entry_point.is_none()
    }

    pub fn merge(&mut self, other: RegisteredCallbacks) {
        if other.run_frame.is_some() {
            self.run_frame = other.run_frame;
        }
        if other.entry_point.is_some() {
            self.entry_point = other.entry_point;
        }
    }

    /// Check the registrations fit `mode`: frontend-driven cores register only
    /// a run-frame callback, self-driven cores only an entry point.
    pub fn check(&self, mode: DriveMode) -> Result<()> {
        match mode {
            DriveMode::FrontendDriven => {
                if self.entry_point.is_some() {
                    return Err(HydraError::WrongDriveMode(
                        "entry point registered by a frontend-driven core".to_string(),
                    ));
                }
                if self.run_frame.is_none() {
                    return Err(HydraError::NotAllCallbacksSet);
                }
            }
            DriveMode::SelfDriven | DriveMode::SelfDrivenExceptAudio => {
                if self.run_frame.is_some() {
                    return Err(HydraError::WrongDriveMode(
                        "run-frame callback registered by a self-driven core".to_string(),
                    ));
                }
                if self.entry_point.is_none() {
                    return Err(HydraError::NotAllCallbacksSet);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hc_abi::raw::{HcFrontendDrivenCallbacks, HcSelfDrivenCallbacks};

    unsafe extern "C" fn noop() {}

    #[test]
    fn test_frontend_driven() {
        let mut frontend = HcFrontendDrivenCallbacks {
            run_frame: Some(noop),
            ..Default::default()
        };
        let raw = HcCallbacks {
            frontend_driven_callbacks: &mut frontend,
            ..Default::default()
        };
        let callbacks = unsafe { RegisteredCallbacks::from_raw(&raw) }.unwrap();
        callbacks.check(DriveMode::FrontendDriven).unwrap();
        assert!(matches!(
            callbacks.check(DriveMode::SelfDriven),
            Err(HydraError::WrongDriveMode(_))
        ));
    }

    #[test]
    fn test_self_driven() {
        let mut self_driven = HcSelfDrivenCallbacks {
            entry_point: Some(noop),
            ..Default::default()
        };
        let raw = HcCallbacks {
            self_driven_callbacks: &mut self_driven,
            ..Default::default()
        };
        let callbacks = unsafe { RegisteredCallbacks::from_raw(&raw) }.unwrap();
        callbacks.check(DriveMode::SelfDrivenExceptAudio).unwrap();
        assert!(matches!(
            callbacks.check(DriveMode::FrontendDriven),
            Err(HydraError::WrongDriveMode(_))
        ));
    }

    #[test]
    fn test_missing_callbacks() {
        let raw = HcCallbacks::default();
        assert!(matches!(
            unsafe { RegisteredCallbacks::from_raw(&raw) },
            Err(HydraError::NotAllCallbacksSet)
        ));

        let mut frontend = HcFrontendDrivenCallbacks::default();
        let raw = HcCallbacks {
            frontend_driven_callbacks: &mut frontend,
            ..Default::default()
        };
        assert!(unsafe { RegisteredCallbacks::from_raw(&raw) }.is_err());

        let none = RegisteredCallbacks::default();
        assert!(matches!(
            none.check(DriveMode::FrontendDriven),
            Err(HydraError::NotAllCallbacksSet)
        ));
        assert!(matches!(
            none.check(DriveMode::SelfDriven),
            Err(HydraError::NotAllCallbacksSet)
        ));
    }

    #[test]
    fn test_merge_keeps_earlier() {
        let mut callbacks = RegisteredCallbacks {
            run_frame: Some(noop),
            entry_point: None,
        };
        callbacks.merge(RegisteredCallbacks::default());
        assert!(callbacks.run_frame.is_some());
    }
}
