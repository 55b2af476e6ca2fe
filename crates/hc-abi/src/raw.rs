//! `repr(C)` structures of the core ABI
//!
//! Every structure starts with the `(ty, next)` header so it can be part of a
//! structure chain, see [`crate::chain`].

use std::ffi::{c_char, c_int, c_void};
use std::ptr;

use crate::enums::*;

/// Leading fields shared by every chainable structure
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HcChainHeader {
    pub ty: HcStructureType,
    pub next: *mut c_void,
}

/// A structure that begins with [`HcChainHeader`].
///
/// # Safety
/// Implementors must be `repr(C)` and have `ty: HcStructureType` followed by
/// `next: *mut c_void` as their first two fields.
pub unsafe trait Chainable: Sized {
    const STRUCTURE_TYPE: HcStructureType;

    fn header(&self) -> &HcChainHeader {
        // SAFETY: guaranteed by the trait contract
        unsafe { &*(self as *const Self as *const HcChainHeader) }
    }

    fn header_mut(&mut self) -> &mut HcChainHeader {
        // SAFETY: guaranteed by the trait contract
        unsafe { &mut *(self as *mut Self as *mut HcChainHeader) }
    }
}

/// Implement [`Chainable`] and a `Default` with the correct tag and every
/// other field zeroed.
macro_rules! chainable {
    ($($ty:ident => $tag:ident),* $(,)?) => {
        $(
            // SAFETY: every listed struct is repr(C) and starts with (ty, next)
            unsafe impl Chainable for $ty {
                const STRUCTURE_TYPE: HcStructureType = HcStructureType::$tag;
            }

            impl Default for $ty {
                fn default() -> Self {
                    // SAFETY: all fields are integers, newtypes over integers,
                    // raw pointers or `Option<fn>`, for which zero is valid
                    let mut value: Self = unsafe { std::mem::zeroed() };
                    value.ty = HcStructureType::$tag;
                    value
                }
            }
        )*
    };
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HcVideoInfo {
    pub ty: HcStructureType,
    pub next: *mut c_void,
    pub renderer_type: HcRendererType,
    /// Packed version of the renderer API the core wants
    pub renderer_version: u32,
    pub width: u32,
    pub height: u32,
    /// Frames per second
    pub frame_rate: u32,
    pub format: HcPixelFormat,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HcAudioInfo {
    pub ty: HcStructureType,
    pub next: *mut c_void,
    pub format: HcAudioFormat,
    pub channels: HcAudioChannels,
    /// Samples per second
    pub sample_rate: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HcImageData {
    pub ty: HcStructureType,
    pub next: *mut c_void,
    /// `stride * height` bytes
    pub data: *mut u8,
    pub width: u32,
    pub height: u32,
    /// Channels per pixel, eg. 4 for RGBA
    pub channels: u32,
    /// Bytes per row, at least `width * channels`
    pub stride: u32,
    pub format: HcPixelFormat,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HcAudioData {
    pub ty: HcStructureType,
    pub next: *mut c_void,
    pub data: *mut u8,
    /// Sample frames in `data`
    pub sample_count: u32,
    pub want: HcAudioInfo,
    pub have: HcAudioInfo,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HcContentInfo {
    pub ty: HcStructureType,
    pub next: *mut c_void,
    pub name: *const c_char,
    pub description: *const c_char,
    pub extensions: *const c_char,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HcCoreInfo {
    pub ty: HcStructureType,
    pub next: *mut c_void,
    pub core_name: *const c_char,
    pub core_version: *const c_char,
    pub system_name: *const c_char,
    pub author: *const c_char,
    pub description: *const c_char,
    pub website: *const c_char,
    pub settings: *const c_char,
    pub license: *const c_char,
    pub loadable_content_info: *mut HcContentInfo,
    pub loadable_content_info_count: c_int,
    pub icon: *mut HcImageData,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HcEnvironmentInfo {
    pub ty: HcStructureType,
    pub next: *mut c_void,
    pub drive_mode: HcDriveMode,
    pub video: *mut HcVideoInfo,
    pub audio: *mut HcAudioInfo,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HcDestroyInfo {
    pub ty: HcStructureType,
    pub next: *mut c_void,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HcResetInfo {
    pub ty: HcStructureType,
    pub next: *mut c_void,
    pub reset_type: HcResetType,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HcHostInfo {
    pub ty: HcStructureType,
    pub next: *mut c_void,
    pub architecture: HcArchitecture,
    pub operating_system: HcOperatingSystem,
    pub gpu_vendor: *const c_char,
    pub open_gl_version: HcOpenGlVersion,
    pub open_gl_es_version: HcOpenGlEsVersion,
    pub web_gl_version: HcWebGlVersion,
    pub vulkan_version: HcVulkanVersion,
    pub metal_version: HcMetalVersion,
    pub direct3d_version: HcDirect3DVersion,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HcInputRequest {
    pub ty: HcStructureType,
    pub next: *mut c_void,
    pub port: u32,
    pub input_type: HcInputType,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HcRunStateInfo {
    pub ty: HcStructureType,
    pub next: *mut c_void,
    pub run_state: HcRunState,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HcContentLoadInfo {
    pub ty: HcStructureType,
    pub next: *mut c_void,
    /// Name of one of the core's loadable content kinds
    pub name: *const c_char,
    pub path: *const c_char,
}

/// Callback with no arguments, used for run-frame and self-driven entry points
pub type HcVoidCallback = unsafe extern "C" fn();

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HcFrontendDrivenCallbacks {
    pub ty: HcStructureType,
    pub next: *mut c_void,
    pub run_frame: Option<HcVoidCallback>,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HcSelfDrivenCallbacks {
    pub ty: HcStructureType,
    pub next: *mut c_void,
    pub entry_point: Option<HcVoidCallback>,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HcCallbacks {
    pub ty: HcStructureType,
    pub next: *mut c_void,
    pub frontend_driven_callbacks: *mut HcFrontendDrivenCallbacks,
    pub self_driven_callbacks: *mut HcSelfDrivenCallbacks,
}

// The nested callback structs have no tag of their own in this revision and
// share `CALLBACKS`.
chainable! {
    HcVideoInfo => VIDEO_INFO,
    HcAudioInfo => AUDIO_INFO,
    HcImageData => IMAGE_DATA,
    HcAudioData => AUDIO_DATA,
    HcContentInfo => CONTENT_INFO,
    HcCoreInfo => CORE_INFO,
    HcEnvironmentInfo => ENVIRONMENT_INFO,
    HcDestroyInfo => CORE_DESTROY_INFO,
    HcResetInfo => CORE_RESET_INFO,
    HcHostInfo => HOST_INFO,
    HcInputRequest => GET_INPUT_REQUEST,
    HcRunStateInfo => CORE_RUN_STATE_INFO,
    HcContentLoadInfo => CONTENT_LOAD_INFO,
    HcFrontendDrivenCallbacks => CALLBACKS,
    HcSelfDrivenCallbacks => CALLBACKS,
    HcCallbacks => CALLBACKS,
}

impl HcEnvironmentInfo {
    /// Environment whose video and audio pointers target caller-owned storage
    /// for the core to fill in
    pub fn with_outputs(video: &mut HcVideoInfo, audio: &mut HcAudioInfo) -> Self {
        Self {
            video: video as *mut HcVideoInfo,
            audio: audio as *mut HcAudioInfo,
            ..Self::default()
        }
    }
}

impl HcHostInfo {
    /// Host info for the running binary with no graphics API support reported
    pub fn current() -> Self {
        Self {
            architecture: HcArchitecture::current(),
            operating_system: HcOperatingSystem::current(),
            gpu_vendor: ptr::null(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, offset_of, size_of};

    #[test]
    fn test_default_sets_tag() {
        assert_eq!(HcVideoInfo::default().ty, HcStructureType::VIDEO_INFO);
        assert_eq!(HcRunStateInfo::default().ty, HcStructureType::CORE_RUN_STATE_INFO);
        assert_eq!(HcCallbacks::default().ty, HcStructureType::CALLBACKS);

        let info = HcCoreInfo::default();
        assert!(info.next.is_null());
        assert!(info.core_name.is_null());
        assert_eq!(info.loadable_content_info_count, 0);

        let callbacks = HcFrontendDrivenCallbacks::default();
        assert!(callbacks.run_frame.is_none());
    }

    #[test]
    fn test_header_layout() {
        assert_eq!(offset_of!(HcChainHeader, ty), 0);
        assert_eq!(offset_of!(HcChainHeader, next), align_of::<*mut c_void>());
        assert_eq!(offset_of!(HcVideoInfo, next), offset_of!(HcChainHeader, next));
        assert_eq!(offset_of!(HcCoreInfo, next), offset_of!(HcChainHeader, next));
        assert_eq!(
            offset_of!(HcAudioData, want) % align_of::<HcAudioInfo>(),
            0
        );
        assert_eq!(size_of::<HcDestroyInfo>(), size_of::<HcChainHeader>());
    }

    #[test]
    fn test_header_view() {
        let mut info = HcResetInfo {
            reset_type: HcResetType::HARD,
            ..Default::default()
        };
        assert_eq!(info.header().ty, HcStructureType::CORE_RESET_INFO);

        let mut tail = HcDestroyInfo::default();
        info.header_mut().next = &mut tail as *mut HcDestroyInfo as *mut c_void;
        assert!(!info.next.is_null());
    }
}
