//! Safe, owned counterparts of the ABI structures
//!
//! Conversions from raw structures validate tags and enum values; anything a
//! peer sends that this revision cannot interpret becomes a typed error.

use std::ffi::{c_char, CStr, CString};
use std::path::PathBuf;

use hc_core::{HydraError, Result};

use crate::enums::*;
use crate::raw::*;

/// Declare a Rust enum mirroring the known values of a C enum newtype.
macro_rules! abi_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident: $raw:ident {
            $($variant:ident = $const:ident),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),*
        }

        impl From<$name> for $raw {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => $raw::$const),*
                }
            }
        }

        impl TryFrom<$raw> for $name {
            type Error = $raw;

            fn try_from(raw: $raw) -> std::result::Result<Self, $raw> {
                match raw {
                    $($raw::$const => Ok($name::$variant),)*
                    other => Err(other),
                }
            }
        }
    };
}

abi_enum! {
    /// Who owns the execution loop. Fixed for the lifetime of an instance.
    pub enum DriveMode: HcDriveMode {
        SelfDriven = SELF_DRIVEN,
        SelfDrivenExceptAudio = SELF_DRIVEN_EXCEPT_AUDIO,
        FrontendDriven = FRONTEND_DRIVEN,
    }
}

impl DriveMode {
    /// Whether the frontend accepts pushed audio in this mode
    pub fn accepts_pushed_audio(self) -> bool {
        !matches!(self, DriveMode::SelfDriven)
    }
}

abi_enum! {
    pub enum RendererType: HcRendererType {
        Software = SOFTWARE,
        OpenGl = OPENGL,
        OpenGlEs = OPENGL_ES,
        WebGl = WEBGL,
        Vulkan = VULKAN,
        Metal = METAL,
        Direct3D = DIRECT3D,
    }
}

abi_enum! {
    pub enum PixelFormat: HcPixelFormat {
        Rgba32 = RGBA32,
        Bgra32 = BGRA32,
        Argb32 = ARGB32,
        Abgr32 = ABGR32,
        Rgb24 = RGB24,
        Bgr24 = BGR24,
        Rgb565 = RGB565,
        Bgr565 = BGR565,
        Rgba5551 = RGBA5551,
        Bgra5551 = BGRA5551,
        Argb1555 = ARGB1555,
        Abgr1555 = ABGR1555,
    }
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Rgba32 | PixelFormat::Bgra32 | PixelFormat::Argb32 | PixelFormat::Abgr32 => 4,
            PixelFormat::Rgb24 | PixelFormat::Bgr24 => 3,
            _ => 2,
        }
    }
}

abi_enum! {
    pub enum AudioFormat: HcAudioFormat {
        U8Pcm = U8_PCM,
        S8Pcm = S8_PCM,
        S16Pcm = S16_PCM,
        S24Pcm = S24_PCM,
        S32Pcm = S32_PCM,
        Float32 = FLOAT32,
        Float64 = FLOAT64,
    }
}

impl AudioFormat {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            AudioFormat::U8Pcm | AudioFormat::S8Pcm => 1,
            AudioFormat::S16Pcm => 2,
            AudioFormat::S24Pcm => 3,
            AudioFormat::S32Pcm | AudioFormat::Float32 => 4,
            AudioFormat::Float64 => 8,
        }
    }
}

abi_enum! {
    pub enum AudioChannels: HcAudioChannels {
        Mono = MONO,
        Stereo = STEREO,
        Surround3_1 = SURROUND_3_1,
        Surround5_1 = SURROUND_5_1,
        Surround7_1 = SURROUND_7_1,
    }
}

impl AudioChannels {
    pub fn count(self) -> usize {
        HcAudioChannels::from(self).0 as usize
    }
}

abi_enum! {
    pub enum ResetType: HcResetType {
        Soft = SOFT,
        Hard = HARD,
    }
}

abi_enum! {
    pub enum RunState: HcRunState {
        Null = NULL,
        Running = RUNNING,
        Paused = PAUSED,
        Quit = QUIT,
    }
}

impl RunState {
    pub fn name(self) -> &'static str {
        match self {
            RunState::Null => "Null",
            RunState::Running => "Running",
            RunState::Paused => "Paused",
            RunState::Quit => "Quit",
        }
    }

    /// Whether moving from `self` to `next` is allowed.
    ///
    /// Re-entering the current state is allowed and is a no-op. Nothing leaves
    /// `Quit`, and nothing returns to `Null`.
    pub fn can_transition_to(self, next: RunState) -> bool {
        match (self, next) {
            (a, b) if a == b => true,
            (RunState::Quit, _) => false,
            (_, RunState::Null) => false,
            _ => true,
        }
    }

    /// Validated transition
    pub fn transition(self, next: RunState) -> Result<RunState> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(HydraError::RunState {
                from: self.name(),
                to: next.name(),
            })
        }
    }
}

/// Copy a possibly-null C string
///
/// # Safety
/// `ptr` must be null or point to a nul-terminated string.
pub unsafe fn string_from_ptr(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

/// Convert to a C string, dropping interior nul bytes
pub fn to_cstring(value: &str) -> CString {
    CString::new(value.replace('\0', "")).unwrap_or_default()
}

fn check_tag<T: Chainable>(raw: &T) -> Result<()> {
    let ty = raw.header().ty;
    if ty == T::STRUCTURE_TYPE {
        Ok(())
    } else {
        Err(HydraError::Core(format!(
            "expected {:?}, found {:?}",
            T::STRUCTURE_TYPE,
            ty
        )))
    }
}

/// Video output of a core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoInfo {
    pub renderer: RendererType,
    pub renderer_version: u32,
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    pub format: PixelFormat,
}

impl VideoInfo {
    pub fn to_raw(&self) -> HcVideoInfo {
        HcVideoInfo {
            renderer_type: self.renderer.into(),
            renderer_version: self.renderer_version,
            width: self.width,
            height: self.height,
            frame_rate: self.frame_rate,
            format: self.format.into(),
            ..Default::default()
        }
    }
}

impl TryFrom<&HcVideoInfo> for VideoInfo {
    type Error = HydraError;

    fn try_from(raw: &HcVideoInfo) -> Result<Self> {
        check_tag(raw).map_err(|e| HydraError::BadEnvironmentInfo(e.to_string()))?;
        let renderer = RendererType::try_from(raw.renderer_type).map_err(|t| {
            HydraError::BadEnvironmentInfo(format!("unsupported renderer {:?}", t))
        })?;
        let format = PixelFormat::try_from(raw.format)
            .map_err(|f| HydraError::BadEnvironmentInfo(format!("bad pixel format {:?}", f)))?;
        if raw.width == 0 || raw.height == 0 {
            return Err(HydraError::BadEnvironmentInfo(format!(
                "zero sized video output {}x{}",
                raw.width, raw.height
            )));
        }
        Ok(Self {
            renderer,
            renderer_version: raw.renderer_version,
            width: raw.width,
            height: raw.height,
            frame_rate: raw.frame_rate,
            format,
        })
    }
}

/// Audio output of a core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioInfo {
    pub format: AudioFormat,
    pub channels: AudioChannels,
    pub sample_rate: u32,
}

impl AudioInfo {
    pub fn to_raw(&self) -> HcAudioInfo {
        HcAudioInfo {
            format: self.format.into(),
            channels: self.channels.into(),
            sample_rate: self.sample_rate,
            ..Default::default()
        }
    }

    /// Bytes occupied by one sample frame
    pub fn frame_size(&self) -> usize {
        self.format.bytes_per_sample() * self.channels.count()
    }

    /// Parse with a caller-chosen error for invalid fields
    pub fn parse(raw: &HcAudioInfo, err: fn(String) -> HydraError) -> Result<Self> {
        check_tag(raw).map_err(|e| err(e.to_string()))?;
        let format = AudioFormat::try_from(raw.format)
            .map_err(|f| err(format!("bad audio format {:?}", f)))?;
        let channels = AudioChannels::try_from(raw.channels)
            .map_err(|c| err(format!("bad channel layout {:?}", c)))?;
        if raw.sample_rate == 0 {
            return Err(err("zero sample rate".to_string()));
        }
        Ok(Self {
            format,
            channels,
            sample_rate: raw.sample_rate,
        })
    }
}

impl TryFrom<&HcAudioInfo> for AudioInfo {
    type Error = HydraError;

    fn try_from(raw: &HcAudioInfo) -> Result<Self> {
        Self::parse(raw, HydraError::BadEnvironmentInfo)
    }
}

/// Environment a core runs in, filled in by the core at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentInfo {
    pub drive_mode: DriveMode,
    pub video: Option<VideoInfo>,
    pub audio: Option<AudioInfo>,
}

impl EnvironmentInfo {
    /// Parse a raw environment.
    ///
    /// # Safety
    /// `video` and `audio` must be null or point to valid structures.
    pub unsafe fn from_raw(raw: &HcEnvironmentInfo) -> Result<Self> {
        check_tag(raw).map_err(|e| HydraError::BadEnvironmentInfo(e.to_string()))?;
        let drive_mode = DriveMode::try_from(raw.drive_mode).map_err(|m| {
            HydraError::BadEnvironmentInfo(format!("bad drive mode {:?}", m))
        })?;
        let video = match raw.video.as_ref() {
            Some(video) => Some(VideoInfo::try_from(video)?),
            None => None,
        };
        let audio = match raw.audio.as_ref() {
            Some(audio) => Some(AudioInfo::try_from(audio)?),
            None => None,
        };
        Ok(Self {
            drive_mode,
            video,
            audio,
        })
    }

    /// Write into a raw environment, filling the video and audio structures
    /// the caller pointed at.
    ///
    /// # Safety
    /// `raw.video` and `raw.audio` must be null or point to writable structures.
    pub unsafe fn write_raw(&self, raw: &mut HcEnvironmentInfo) -> Result<()> {
        raw.drive_mode = self.drive_mode.into();
        if let Some(video) = &self.video {
            let target = raw
                .video
                .as_mut()
                .ok_or(HydraError::NullDataPassed("environment video"))?;
            let next = target.next;
            *target = video.to_raw();
            target.next = next;
        }
        if let Some(audio) = &self.audio {
            let target = raw
                .audio
                .as_mut()
                .ok_or(HydraError::NullDataPassed("environment audio"))?;
            let next = target.next;
            *target = audio.to_raw();
            target.next = next;
        }
        Ok(())
    }
}

/// Information about the host system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub architecture: HcArchitecture,
    pub operating_system: HcOperatingSystem,
    pub gpu_vendor: Option<String>,
    pub open_gl_version: HcOpenGlVersion,
    pub open_gl_es_version: HcOpenGlEsVersion,
    pub web_gl_version: HcWebGlVersion,
    pub vulkan_version: HcVulkanVersion,
    pub metal_version: HcMetalVersion,
    pub direct3d_version: HcDirect3DVersion,
}

impl HostInfo {
    /// # Safety
    /// `raw.gpu_vendor` must be null or a valid C string.
    pub unsafe fn from_raw(raw: &HcHostInfo) -> Self {
        Self {
            architecture: raw.architecture,
            operating_system: raw.operating_system,
            gpu_vendor: string_from_ptr(raw.gpu_vendor),
            open_gl_version: raw.open_gl_version,
            open_gl_es_version: raw.open_gl_es_version,
            web_gl_version: raw.web_gl_version,
            vulkan_version: raw.vulkan_version,
            metal_version: raw.metal_version,
            direct3d_version: raw.direct3d_version,
        }
    }

    /// Whether the host can provide `renderer` at all
    pub fn supports(&self, renderer: RendererType) -> bool {
        match renderer {
            RendererType::Software => true,
            RendererType::OpenGl => self.open_gl_version != HcOpenGlVersion::NOT_SUPPORTED,
            RendererType::OpenGlEs => {
                self.open_gl_es_version != HcOpenGlEsVersion::NOT_SUPPORTED
            }
            RendererType::WebGl => self.web_gl_version != HcWebGlVersion::NOT_SUPPORTED,
            RendererType::Vulkan => self.vulkan_version != HcVulkanVersion::NOT_SUPPORTED,
            RendererType::Metal => self.metal_version != HcMetalVersion::NOT_SUPPORTED,
            RendererType::Direct3D => {
                self.direct3d_version != HcDirect3DVersion::NOT_SUPPORTED
            }
        }
    }
}

/// A kind of content a core can load
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentInfo {
    pub name: String,
    pub description: String,
    /// File extensions, as the core lists them (eg. `"gb,gbc"`)
    pub extensions: String,
}

impl ContentInfo {
    pub fn matches_extension(&self, ext: &str) -> bool {
        self.extensions
            .split([',', ';', ' '])
            .map(|e| e.trim().trim_start_matches('.'))
            .any(|e| !e.is_empty() && e.eq_ignore_ascii_case(ext))
    }
}

/// Core icon, pixel data owned by the core info
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

/// Metadata a core reports once after being loaded
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoreInfo {
    pub core_name: String,
    pub core_version: String,
    pub system_name: String,
    pub author: String,
    pub description: String,
    pub website: String,
    pub settings: String,
    pub license: String,
    pub loadable_content: Vec<ContentInfo>,
    pub icon: Option<Icon>,
}

impl CoreInfo {
    /// Copy a raw core info
    ///
    /// # Safety
    /// Every pointer in `raw` must be null or valid for its declared type and
    /// count.
    pub unsafe fn from_raw(raw: &HcCoreInfo) -> Result<Self> {
        check_tag(raw)?;
        let text = |ptr| string_from_ptr(ptr).unwrap_or_default();

        let mut loadable_content = Vec::new();
        if !raw.loadable_content_info.is_null() && raw.loadable_content_info_count > 0 {
            let infos = std::slice::from_raw_parts(
                raw.loadable_content_info,
                raw.loadable_content_info_count as usize,
            );
            for info in infos {
                loadable_content.push(ContentInfo {
                    name: text(info.name),
                    description: text(info.description),
                    extensions: text(info.extensions),
                });
            }
        }

        let icon = match raw.icon.as_ref() {
            Some(image) if !image.data.is_null() => {
                let format = PixelFormat::try_from(image.format)
                    .map_err(|f| HydraError::Core(format!("bad icon format {:?}", f)))?;
                let len = image.stride as usize * image.height as usize;
                Some(Icon {
                    width: image.width,
                    height: image.height,
                    format,
                    data: std::slice::from_raw_parts(image.data, len).to_vec(),
                })
            }
            _ => None,
        };

        Ok(Self {
            core_name: text(raw.core_name),
            core_version: text(raw.core_version),
            system_name: text(raw.system_name),
            author: text(raw.author),
            description: text(raw.description),
            website: text(raw.website),
            settings: text(raw.settings),
            license: text(raw.license),
            loadable_content,
            icon,
        })
    }

    /// Find the content kind called `name`
    pub fn content(&self, name: &str) -> Option<&ContentInfo> {
        self.loadable_content.iter().find(|c| c.name == name)
    }
}

/// C strings and arrays backing a raw [`HcCoreInfo`].
///
/// The raw view borrows from this storage, so it stays valid for as long as
/// the storage lives.
pub struct CoreInfoStorage {
    _strings: Vec<CString>,
    contents: Vec<HcContentInfo>,
    icon_data: Vec<u8>,
    icon: Option<HcImageData>,
    raw: HcCoreInfo,
}

// SAFETY: the raw pointers only target heap storage owned by this value and
// nothing mutates it after construction.
unsafe impl Send for CoreInfoStorage {}
unsafe impl Sync for CoreInfoStorage {}

impl CoreInfoStorage {
    pub fn new(info: &CoreInfo) -> Box<Self> {
        let mut strings = Vec::new();
        let mut intern = |value: &str| {
            let s = to_cstring(value);
            let ptr = s.as_ptr();
            strings.push(s);
            ptr
        };

        let contents: Vec<HcContentInfo> = info
            .loadable_content
            .iter()
            .map(|c| HcContentInfo {
                name: intern(&c.name),
                description: intern(&c.description),
                extensions: intern(&c.extensions),
                ..Default::default()
            })
            .collect();

        let raw = HcCoreInfo {
            core_name: intern(&info.core_name),
            core_version: intern(&info.core_version),
            system_name: intern(&info.system_name),
            author: intern(&info.author),
            description: intern(&info.description),
            website: intern(&info.website),
            settings: intern(&info.settings),
            license: intern(&info.license),
            ..Default::default()
        };

        let mut storage = Box::new(Self {
            _strings: strings,
            contents,
            icon_data: info.icon.as_ref().map(|i| i.data.clone()).unwrap_or_default(),
            icon: None,
            raw,
        });

        if let Some(icon) = &info.icon {
            let stride = icon.width * icon.format.bytes_per_pixel();
            storage.icon = Some(HcImageData {
                data: storage.icon_data.as_mut_ptr(),
                width: icon.width,
                height: icon.height,
                channels: icon.format.bytes_per_pixel().min(4),
                stride,
                format: icon.format.into(),
                ..Default::default()
            });
        }

        storage.raw.loadable_content_info = storage.contents.as_mut_ptr();
        storage.raw.loadable_content_info_count = storage.contents.len() as i32;
        storage.raw.icon = match storage.icon.as_mut() {
            Some(icon) => icon as *mut HcImageData,
            None => std::ptr::null_mut(),
        };
        storage
    }

    /// Copy the raw view into `out`, keeping the caller's `next` pointer
    pub fn write_to(&self, out: &mut HcCoreInfo) {
        let next = out.next;
        *out = self.raw;
        out.next = next;
    }

    pub fn raw(&self) -> &HcCoreInfo {
        &self.raw
    }
}

/// A raw image borrowed for one call
#[derive(Debug, Clone, Copy)]
pub struct ImageData<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub stride: u32,
    pub format: PixelFormat,
}

impl<'a> ImageData<'a> {
    /// Tightly packed image in `format`
    pub fn packed(data: &'a [u8], width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            data,
            width,
            height,
            channels: format.bytes_per_pixel().min(4),
            stride: width * format.bytes_per_pixel(),
            format,
        }
    }

    /// Raw view for passing to the frontend. The data pointer is only valid
    /// while `self` is borrowed.
    pub fn to_raw(&self) -> HcImageData {
        HcImageData {
            data: self.data.as_ptr() as *mut u8,
            width: self.width,
            height: self.height,
            channels: self.channels,
            stride: self.stride,
            format: self.format.into(),
            ..Default::default()
        }
    }

    /// Validate and borrow a raw image
    ///
    /// # Safety
    /// `raw.data` must be null or valid for `stride * height` bytes during `'a`.
    pub unsafe fn from_raw(raw: &'a HcImageData) -> Result<Self> {
        check_tag(raw)?;
        if raw.data.is_null() {
            return Err(HydraError::NullDataPassed("image data"));
        }
        let format = PixelFormat::try_from(raw.format)
            .map_err(|f| HydraError::Core(format!("bad pixel format {:?}", f)))?;
        let min_stride = raw.width.saturating_mul(raw.channels);
        if raw.stride < min_stride {
            return Err(HydraError::Core(format!(
                "stride {} is smaller than width * channels ({})",
                raw.stride, min_stride
            )));
        }
        let len = raw.stride as usize * raw.height as usize;
        Ok(Self {
            data: std::slice::from_raw_parts(raw.data, len),
            width: raw.width,
            height: raw.height,
            channels: raw.channels,
            stride: raw.stride,
            format,
        })
    }
}

/// Audio samples borrowed for one call
#[derive(Debug, Clone, Copy)]
pub struct AudioData<'a> {
    pub data: &'a [u8],
    pub sample_count: u32,
    pub want: AudioInfo,
    pub have: AudioInfo,
}

impl<'a> AudioData<'a> {
    pub fn to_raw(&self) -> HcAudioData {
        HcAudioData {
            data: self.data.as_ptr() as *mut u8,
            sample_count: self.sample_count,
            want: self.want.to_raw(),
            have: self.have.to_raw(),
            ..Default::default()
        }
    }

    /// Validate and borrow raw audio data
    ///
    /// # Safety
    /// `raw.data` must be null or valid for `sample_count` frames of the
    /// `have` format during `'a`.
    pub unsafe fn from_raw(raw: &'a HcAudioData) -> Result<Self> {
        check_tag(raw)?;
        let want = AudioInfo::parse(&raw.want, HydraError::BadAudioDataWant)?;
        let have = AudioInfo::parse(&raw.have, HydraError::BadAudioDataHave)?;
        if raw.data.is_null() {
            if raw.sample_count == 0 {
                return Ok(Self {
                    data: &[],
                    sample_count: 0,
                    want,
                    have,
                });
            }
            return Err(HydraError::NullDataPassed("audio data"));
        }
        let len = raw.sample_count as usize * have.frame_size();
        Ok(Self {
            data: std::slice::from_raw_parts(raw.data, len),
            sample_count: raw.sample_count,
            want,
            have,
        })
    }
}

/// One input value a core asks the frontend for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputRequest {
    pub port: u32,
    pub input_type: HcInputType,
}

impl InputRequest {
    pub fn to_raw(&self) -> HcInputRequest {
        HcInputRequest {
            port: self.port,
            input_type: self.input_type,
            ..Default::default()
        }
    }
}

impl TryFrom<&HcInputRequest> for InputRequest {
    type Error = HydraError;

    fn try_from(raw: &HcInputRequest) -> Result<Self> {
        check_tag(raw).map_err(|e| HydraError::BadInputRequest(e.to_string()))?;
        Ok(Self {
            port: raw.port,
            input_type: raw.input_type,
        })
    }
}

/// Content the frontend asks a core to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLoad {
    /// Name of one of the core's [`ContentInfo`] kinds
    pub name: String,
    pub path: PathBuf,
}

impl ContentLoad {
    /// # Safety
    /// `raw.name` and `raw.path` must be null or valid C strings.
    pub unsafe fn from_raw(raw: &HcContentLoadInfo) -> Result<Self> {
        check_tag(raw).map_err(|e| HydraError::BadContent(e.to_string()))?;
        let path = string_from_ptr(raw.path).ok_or(HydraError::NullDataPassed("content path"))?;
        Ok(Self {
            name: string_from_ptr(raw.name).unwrap_or_default(),
            path: PathBuf::from(path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_video() -> VideoInfo {
        VideoInfo {
            renderer: RendererType::Software,
            renderer_version: 0,
            width: 160,
            height: 144,
            frame_rate: 60,
            format: PixelFormat::Rgba32,
        }
    }

    #[test]
    fn test_enum_conversion() {
        assert_eq!(HcDriveMode::from(DriveMode::FrontendDriven), HcDriveMode::FRONTEND_DRIVEN);
        assert_eq!(DriveMode::try_from(HcDriveMode::SELF_DRIVEN), Ok(DriveMode::SelfDriven));
        assert_eq!(DriveMode::try_from(HcDriveMode::NULL), Err(HcDriveMode::NULL));
        assert_eq!(AudioChannels::Surround5_1.count(), 6);
        assert_eq!(PixelFormat::Rgb565.bytes_per_pixel(), 2);
    }

    #[test]
    fn test_run_state_transitions() {
        use RunState::*;
        assert!(Null.can_transition_to(Running));
        assert!(Running.can_transition_to(Paused));
        assert!(Paused.can_transition_to(Running));
        assert!(Paused.can_transition_to(Quit));
        assert!(Quit.can_transition_to(Quit));
        assert!(!Quit.can_transition_to(Running));
        assert!(!Running.can_transition_to(Null));

        let err = Quit.transition(Paused).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Run state transition from Quit to Paused is not allowed"
        );
    }

    #[test]
    fn test_video_info_validation() {
        let raw = sample_video().to_raw();
        assert_eq!(VideoInfo::try_from(&raw).unwrap(), sample_video());

        let mut bad = raw;
        bad.format = HcPixelFormat(99);
        assert!(matches!(
            VideoInfo::try_from(&bad),
            Err(HydraError::BadEnvironmentInfo(_))
        ));

        let mut bad = raw;
        bad.width = 0;
        assert!(VideoInfo::try_from(&bad).is_err());
    }

    #[test]
    fn test_environment_write_keeps_caller_storage() {
        let env = EnvironmentInfo {
            drive_mode: DriveMode::FrontendDriven,
            video: Some(sample_video()),
            audio: None,
        };
        let mut video = HcVideoInfo::default();
        let mut audio = HcAudioInfo::default();
        let mut raw = HcEnvironmentInfo::with_outputs(&mut video, &mut audio);
        unsafe { env.write_raw(&mut raw).unwrap() };
        assert_eq!(video.width, 160);
        assert_eq!(audio.format, HcAudioFormat::NULL);

        let mut raw = HcEnvironmentInfo {
            video: &mut video,
            ..Default::default()
        };
        let parsed = unsafe {
            env.write_raw(&mut raw).unwrap();
            EnvironmentInfo::from_raw(&raw).unwrap()
        };
        assert_eq!(parsed, env);

        let mut raw = HcEnvironmentInfo::default();
        let err = unsafe { env.write_raw(&mut raw) }.unwrap_err();
        assert!(matches!(err, HydraError::NullDataPassed(_)));
    }

    #[test]
    fn test_core_info_storage() {
        let info = CoreInfo {
            core_name: "Test".into(),
            core_version: "1.0".into(),
            system_name: "Pattern".into(),
            license: "MIT".into(),
            loadable_content: vec![ContentInfo {
                name: "rom".into(),
                description: "Pattern seed".into(),
                extensions: "bin,seed".into(),
            }],
            icon: Some(Icon {
                width: 2,
                height: 1,
                format: PixelFormat::Rgba32,
                data: vec![255; 8],
            }),
            ..Default::default()
        };
        let storage = CoreInfoStorage::new(&info);
        let mut out = HcCoreInfo::default();
        storage.write_to(&mut out);
        let parsed = unsafe { CoreInfo::from_raw(&out).unwrap() };
        assert_eq!(parsed, info);
        assert!(parsed.content("rom").unwrap().matches_extension("SEED"));
        assert!(!parsed.content("rom").unwrap().matches_extension("gb"));
    }

    #[test]
    fn test_image_stride_check() {
        let pixels = [0u8; 16];
        let image = ImageData::packed(&pixels, 2, 2, PixelFormat::Rgba32);
        let raw = image.to_raw();
        assert!(unsafe { ImageData::from_raw(&raw) }.is_ok());

        let mut bad = raw;
        bad.stride = 4;
        assert!(unsafe { ImageData::from_raw(&bad) }.is_err());

        let mut null = raw;
        null.data = std::ptr::null_mut();
        assert!(matches!(
            unsafe { ImageData::from_raw(&null) },
            Err(HydraError::NullDataPassed(_))
        ));
    }

    #[test]
    fn test_audio_data_validation() {
        let info = AudioInfo {
            format: AudioFormat::S16Pcm,
            channels: AudioChannels::Stereo,
            sample_rate: 48000,
        };
        let samples = [0u8; 16];
        let data = AudioData {
            data: &samples,
            sample_count: 4,
            want: info,
            have: info,
        };
        let raw = data.to_raw();
        let parsed = unsafe { AudioData::from_raw(&raw).unwrap() };
        assert_eq!(parsed.data.len(), 16);

        let mut bad = raw;
        bad.want.sample_rate = 0;
        assert!(matches!(
            unsafe { AudioData::from_raw(&bad) },
            Err(HydraError::BadAudioDataWant(_))
        ));

        let mut bad = raw;
        bad.have.channels = HcAudioChannels(3);
        assert!(matches!(
            unsafe { AudioData::from_raw(&bad) },
            Err(HydraError::BadAudioDataHave(_))
        ));
    }
}
