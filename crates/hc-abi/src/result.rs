//! Result codes returned by every cross-boundary call

use hc_core::HydraError;

/// C `HcResult`. Zero is success, negative values are errors.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HcResult(pub i32);

impl HcResult {
    pub const SUCCESS: Self = Self(0);
    /// Failure reported by the core; details through `hcGetError`
    pub const ERROR_CORE: Self = Self(-1001);
    pub const ERROR_NOT_ALL_CALLBACKS_SET: Self = Self(-2001);
    pub const ERROR_WRONG_DRIVE_MODE: Self = Self(-2002);
    pub const ERROR_NULL_DATA_PASSED: Self = Self(-2003);
    pub const ERROR_BAD_RENDERER_VERSION: Self = Self(-2004);
    pub const ERROR_BAD_CONTENT: Self = Self(-2005);
    pub const ERROR_BAD_INPUT_REQUEST: Self = Self(-2006);
    pub const ERROR_BAD_ENVIRONMENT_INFO: Self = Self(-2007);
    pub const ERROR_BAD_AUDIO_DATA_WANT: Self = Self(-2008);
    pub const ERROR_BAD_AUDIO_DATA_HAVE: Self = Self(-2009);
    pub const ERROR_AUDIO_OVERRUN: Self = Self(-2010);
    pub const ERROR_AUDIO_FULLY_SELF_DRIVEN: Self = Self(-2011);
    pub const ERROR_NOT_SOFTWARE_RENDERED: Self = Self(-2012);
    pub const ERROR_NOT_OPENGL_RENDERED: Self = Self(-2013);
    pub const ERROR_NOT_VULKAN_RENDERED: Self = Self(-2014);
    pub const ERROR_NOT_METAL_RENDERED: Self = Self(-2015);
    pub const ERROR_NOT_DIRECT3D_RENDERED: Self = Self(-2016);
    pub const ERROR_TOO_MANY_INSTANCES: Self = Self(-2017);
    pub const INTERNAL_ERROR_BAD_LOADFUNCTIONPTR: Self = Self(-5001);
    pub const INTERNAL_ERROR_MISSING_FUNCTION: Self = Self(-5002);
    pub const INTERNAL_ERROR_WRAPPER_NOT_INITIALIZED: Self = Self(-5003);

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::SUCCESS => "HC_SUCCESS",
            Self::ERROR_CORE => "HC_ERROR_CORE",
            Self::ERROR_NOT_ALL_CALLBACKS_SET => "HC_ERROR_NOT_ALL_CALLBACKS_SET",
            Self::ERROR_WRONG_DRIVE_MODE => "HC_ERROR_WRONG_DRIVE_MODE",
            Self::ERROR_NULL_DATA_PASSED => "HC_ERROR_NULL_DATA_PASSED",
            Self::ERROR_BAD_RENDERER_VERSION => "HC_ERROR_BAD_RENDERER_VERSION",
            Self::ERROR_BAD_CONTENT => "HC_ERROR_BAD_CONTENT",
            Self::ERROR_BAD_INPUT_REQUEST => "HC_ERROR_BAD_INPUT_REQUEST",
            Self::ERROR_BAD_ENVIRONMENT_INFO => "HC_ERROR_BAD_ENVIRONMENT_INFO",
            Self::ERROR_BAD_AUDIO_DATA_WANT => "HC_ERROR_BAD_AUDIO_DATA_WANT",
            Self::ERROR_BAD_AUDIO_DATA_HAVE => "HC_ERROR_BAD_AUDIO_DATA_HAVE",
            Self::ERROR_AUDIO_OVERRUN => "HC_ERROR_AUDIO_OVERRUN",
            Self::ERROR_AUDIO_FULLY_SELF_DRIVEN => "HC_ERROR_AUDIO_FULLY_SELF_DRIVEN",
            Self::ERROR_NOT_SOFTWARE_RENDERED => "HC_ERROR_NOT_SOFTWARE_RENDERED",
            Self::ERROR_NOT_OPENGL_RENDERED => "HC_ERROR_NOT_OPENGL_RENDERED",
            Self::ERROR_NOT_VULKAN_RENDERED => "HC_ERROR_NOT_VULKAN_RENDERED",
            Self::ERROR_NOT_METAL_RENDERED => "HC_ERROR_NOT_METAL_RENDERED",
            Self::ERROR_NOT_DIRECT3D_RENDERED => "HC_ERROR_NOT_DIRECT3D_RENDERED",
            Self::ERROR_TOO_MANY_INSTANCES => "HC_ERROR_TOO_MANY_INSTANCES",
            Self::INTERNAL_ERROR_BAD_LOADFUNCTIONPTR => "HC_INTERNAL_ERROR_BAD_LOADFUNCTIONPTR",
            Self::INTERNAL_ERROR_MISSING_FUNCTION => "HC_INTERNAL_ERROR_MISSING_FUNCTION",
            Self::INTERNAL_ERROR_WRAPPER_NOT_INITIALIZED => {
                "HC_INTERNAL_ERROR_WRAPPER_NOT_INITIALIZED"
            }
            _ => "HC_UNKNOWN_RESULT",
        }
    }

    /// Convert a code received from the other side of the boundary.
    ///
    /// `detail` is attached to variants that carry a message, typically the
    /// string from `hcGetError` for `ERROR_CORE`.
    pub fn into_result(self, detail: Option<String>) -> hc_core::Result<()> {
        let detail = || detail.clone().unwrap_or_default();
        let err = match self {
            Self::SUCCESS => return Ok(()),
            Self::ERROR_CORE => HydraError::Core(detail()),
            Self::ERROR_NOT_ALL_CALLBACKS_SET => HydraError::NotAllCallbacksSet,
            Self::ERROR_WRONG_DRIVE_MODE => HydraError::WrongDriveMode(detail()),
            Self::ERROR_NULL_DATA_PASSED => HydraError::NullDataPassed("reported by peer"),
            Self::ERROR_BAD_RENDERER_VERSION => HydraError::BadRendererVersion(detail()),
            Self::ERROR_BAD_CONTENT => HydraError::BadContent(detail()),
            Self::ERROR_BAD_INPUT_REQUEST => HydraError::BadInputRequest(detail()),
            Self::ERROR_BAD_ENVIRONMENT_INFO => HydraError::BadEnvironmentInfo(detail()),
            Self::ERROR_BAD_AUDIO_DATA_WANT => HydraError::BadAudioDataWant(detail()),
            Self::ERROR_BAD_AUDIO_DATA_HAVE => HydraError::BadAudioDataHave(detail()),
            Self::ERROR_AUDIO_OVERRUN => HydraError::AudioOverrun {
                queued: 0,
                pushed: 0,
                capacity: 0,
            },
            Self::ERROR_AUDIO_FULLY_SELF_DRIVEN => HydraError::AudioFullySelfDriven,
            Self::ERROR_NOT_SOFTWARE_RENDERED => HydraError::NotSoftwareRendered,
            Self::ERROR_NOT_OPENGL_RENDERED => HydraError::NotOpenGlRendered,
            Self::ERROR_NOT_VULKAN_RENDERED => HydraError::NotVulkanRendered,
            Self::ERROR_NOT_METAL_RENDERED => HydraError::NotMetalRendered,
            Self::ERROR_NOT_DIRECT3D_RENDERED => HydraError::NotDirect3DRendered,
            Self::ERROR_TOO_MANY_INSTANCES => HydraError::TooManyInstances { limit: 1 },
            Self::INTERNAL_ERROR_BAD_LOADFUNCTIONPTR => HydraError::BadLoadFunctionPtr,
            Self::INTERNAL_ERROR_MISSING_FUNCTION => HydraError::MissingFunction(detail()),
            Self::INTERNAL_ERROR_WRAPPER_NOT_INITIALIZED => HydraError::WrapperNotInitialized,
            other => HydraError::Core(format!("unknown result code {}", other.0)),
        };
        Err(err)
    }
}

impl From<&HydraError> for HcResult {
    fn from(err: &HydraError) -> Self {
        match err {
            HydraError::Core(_) => Self::ERROR_CORE,
            HydraError::NotAllCallbacksSet => Self::ERROR_NOT_ALL_CALLBACKS_SET,
            HydraError::WrongDriveMode(_) => Self::ERROR_WRONG_DRIVE_MODE,
            HydraError::NullDataPassed(_) => Self::ERROR_NULL_DATA_PASSED,
            HydraError::BadRendererVersion(_) => Self::ERROR_BAD_RENDERER_VERSION,
            HydraError::BadContent(_) => Self::ERROR_BAD_CONTENT,
            HydraError::BadInputRequest(_) => Self::ERROR_BAD_INPUT_REQUEST,
            HydraError::BadEnvironmentInfo(_) => Self::ERROR_BAD_ENVIRONMENT_INFO,
            HydraError::BadAudioDataWant(_) => Self::ERROR_BAD_AUDIO_DATA_WANT,
            HydraError::BadAudioDataHave(_) => Self::ERROR_BAD_AUDIO_DATA_HAVE,
            HydraError::AudioOverrun { .. } => Self::ERROR_AUDIO_OVERRUN,
            HydraError::AudioFullySelfDriven => Self::ERROR_AUDIO_FULLY_SELF_DRIVEN,
            HydraError::NotSoftwareRendered => Self::ERROR_NOT_SOFTWARE_RENDERED,
            HydraError::NotOpenGlRendered => Self::ERROR_NOT_OPENGL_RENDERED,
            HydraError::NotVulkanRendered => Self::ERROR_NOT_VULKAN_RENDERED,
            HydraError::NotMetalRendered => Self::ERROR_NOT_METAL_RENDERED,
            HydraError::NotDirect3DRendered => Self::ERROR_NOT_DIRECT3D_RENDERED,
            HydraError::TooManyInstances { .. } => Self::ERROR_TOO_MANY_INSTANCES,
            HydraError::BadLoadFunctionPtr => Self::INTERNAL_ERROR_BAD_LOADFUNCTIONPTR,
            HydraError::MissingFunction(_) => Self::INTERNAL_ERROR_MISSING_FUNCTION,
            HydraError::WrapperNotInitialized => Self::INTERNAL_ERROR_WRAPPER_NOT_INITIALIZED,
            // Everything else is core-internal and only described by its message
            HydraError::RunState { .. }
            | HydraError::Library(_)
            | HydraError::Io(_)
            | HydraError::Config(_) => Self::ERROR_CORE,
        }
    }
}

impl<T> From<&hc_core::Result<T>> for HcResult {
    fn from(result: &hc_core::Result<T>) -> Self {
        match result {
            Ok(_) => Self::SUCCESS,
            Err(err) => err.into(),
        }
    }
}

impl core::fmt::Debug for HcResult {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}({})", self.name(), self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values() {
        assert_eq!(HcResult::ERROR_CORE.0, -1001);
        assert_eq!(HcResult::ERROR_NOT_ALL_CALLBACKS_SET.0, -2001);
        assert_eq!(HcResult::ERROR_NOT_DIRECT3D_RENDERED.0, -2016);
        assert_eq!(HcResult::INTERNAL_ERROR_BAD_LOADFUNCTIONPTR.0, -5001);
        assert_eq!(HcResult::INTERNAL_ERROR_WRAPPER_NOT_INITIALIZED.0, -5003);
    }

    #[test]
    fn test_error_to_code() {
        let err = HydraError::MissingFunction("hcGlSwapBuffers".into());
        assert_eq!(HcResult::from(&err), HcResult::INTERNAL_ERROR_MISSING_FUNCTION);

        let err = HydraError::RunState {
            from: "Quit",
            to: "Running",
        };
        assert_eq!(HcResult::from(&err), HcResult::ERROR_CORE);

        let ok: hc_core::Result<u32> = Ok(7);
        assert!(HcResult::from(&ok).is_success());
    }

    #[test]
    fn test_code_to_error() {
        assert!(HcResult::SUCCESS.into_result(None).is_ok());

        let err = HcResult::ERROR_CORE
            .into_result(Some("rom checksum mismatch".into()))
            .unwrap_err();
        assert_eq!(err.to_string(), "Core error: rom checksum mismatch");

        let err = HcResult::ERROR_NOT_OPENGL_RENDERED.into_result(None).unwrap_err();
        assert!(matches!(err, HydraError::NotOpenGlRendered));

        let err = HcResult(-42).into_result(None).unwrap_err();
        assert!(matches!(err, HydraError::Core(_)));
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(
            format!("{:?}", HcResult::ERROR_AUDIO_OVERRUN),
            "HC_ERROR_AUDIO_OVERRUN(-2010)"
        );
    }
}
