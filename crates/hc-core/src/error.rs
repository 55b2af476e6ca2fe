//! Error types for hydra
//!
//! Every failure that can cross the core/frontend boundary has a variant here.
//! The numeric result code for each variant lives in `hc-abi`.

use thiserror::Error;

/// Main error type shared by cores and frontends
#[derive(Error, Debug)]
pub enum HydraError {
    /// Opaque failure reported by a core. The message is what `hcGetError` returns.
    #[error("Core error: {0}")]
    Core(String),

    #[error("Not all callbacks were set")]
    NotAllCallbacksSet,

    #[error("Wrong drive mode: {0}")]
    WrongDriveMode(String),

    #[error("Null data passed: {0}")]
    NullDataPassed(&'static str),

    #[error("Bad renderer version: {0}")]
    BadRendererVersion(String),

    #[error("Bad content: {0}")]
    BadContent(String),

    #[error("Bad input request: {0}")]
    BadInputRequest(String),

    #[error("Bad environment info: {0}")]
    BadEnvironmentInfo(String),

    #[error("Bad audio data want: {0}")]
    BadAudioDataWant(String),

    #[error("Bad audio data have: {0}")]
    BadAudioDataHave(String),

    #[error("Audio overrun: {queued} + {pushed} samples exceed capacity {capacity}")]
    AudioOverrun {
        queued: usize,
        pushed: usize,
        capacity: usize,
    },

    #[error("Core is fully self-driven, the frontend does not accept audio")]
    AudioFullySelfDriven,

    #[error("Core is not software rendered")]
    NotSoftwareRendered,

    #[error("Core is not OpenGL rendered")]
    NotOpenGlRendered,

    #[error("Core is not Vulkan rendered")]
    NotVulkanRendered,

    #[error("Core is not Metal rendered")]
    NotMetalRendered,

    #[error("Core is not Direct3D rendered")]
    NotDirect3DRendered,

    #[error("Too many instances: limit is {limit}")]
    TooManyInstances { limit: usize },

    #[error("Run state transition from {from} to {to} is not allowed")]
    RunState {
        from: &'static str,
        to: &'static str,
    },

    #[error("Load function pointer is null")]
    BadLoadFunctionPtr,

    #[error("Missing function: {0}")]
    MissingFunction(String),

    #[error("Wrapper not initialized")]
    WrapperNotInitialized,

    #[error("Library error: {0}")]
    Library(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl HydraError {
    /// Loader-only failures, fatal to module initialization
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::BadLoadFunctionPtr | Self::MissingFunction(_) | Self::WrapperNotInitialized
        )
    }

    /// Failures caused by asking a core for something its renderer or drive mode
    /// does not provide. Callers are expected to check capability first.
    pub fn is_capability_mismatch(&self) -> bool {
        matches!(
            self,
            Self::AudioFullySelfDriven
                | Self::NotSoftwareRendered
                | Self::NotOpenGlRendered
                | Self::NotVulkanRendered
                | Self::NotMetalRendered
                | Self::NotDirect3DRendered
        )
    }
}

/// Result type alias for hydra operations
pub type Result<T> = std::result::Result<T, HydraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HydraError::MissingFunction("hcPushSamples".to_string());
        assert_eq!(format!("{}", err), "Missing function: hcPushSamples");

        let err = HydraError::AudioOverrun {
            queued: 4000,
            pushed: 200,
            capacity: 4096,
        };
        assert_eq!(
            format!("{}", err),
            "Audio overrun: 4000 + 200 samples exceed capacity 4096"
        );
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: HydraError = io_err.into();
        assert!(matches!(err, HydraError::Io(_)));
    }

    #[test]
    fn test_error_classes() {
        assert!(HydraError::BadLoadFunctionPtr.is_internal());
        assert!(HydraError::WrapperNotInitialized.is_internal());
        assert!(!HydraError::NotAllCallbacksSet.is_internal());

        assert!(HydraError::NotOpenGlRendered.is_capability_mismatch());
        assert!(HydraError::AudioFullySelfDriven.is_capability_mismatch());
        assert!(!HydraError::Core("boom".into()).is_capability_mismatch());
    }
}
