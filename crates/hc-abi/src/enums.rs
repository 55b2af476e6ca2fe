//! C enumerations of the core ABI
//!
//! Every enum is a `repr(transparent)` newtype over the C `int` so that values
//! a newer peer sends are still representable. Safe Rust enums for the values
//! this revision understands live in [`crate::model`].

/// Declare a C enum newtype with associated constants.
macro_rules! c_enum {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub i32);

        impl $name {
            $(
                $(#[$vmeta])*
                pub const $variant: Self = Self($value);
            )*

            /// Every value this revision defines, in declaration order
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Constant name, or `None` for a value this revision does not define
            pub fn name(self) -> Option<&'static str> {
                match self {
                    $(Self::$variant => Some(stringify!($variant)),)*
                    _ => None,
                }
            }

            pub fn is_known(self) -> bool {
                self.name().is_some()
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match self.name() {
                    Some(name) => write!(f, "{}::{}", stringify!($name), name),
                    None => write!(f, "{}({})", stringify!($name), self.0),
                }
            }
        }
    };
}

/// Pack a `major.minor` graphics API version the way the header does
pub const fn api_version(major: i32, minor: i32) -> i32 {
    (major << 16) | minor
}

/// Split a packed `major << 16 | minor` version
pub const fn split_api_version(version: i32) -> (u16, u16) {
    ((version >> 16) as u16, (version & 0xFFFF) as u16)
}

c_enum! {
    pub struct HcPixelFormat {
        NULL = 0,
        RGBA32 = 1,
        BGRA32 = 2,
        ARGB32 = 3,
        ABGR32 = 4,
        RGB24 = 5,
        BGR24 = 6,
        RGB565 = 7,
        BGR565 = 8,
        RGBA5551 = 9,
        BGRA5551 = 10,
        ARGB1555 = 11,
        ABGR1555 = 12,
    }
}

c_enum! {
    pub struct HcArchitecture {
        UNKNOWN = 0,
        X86 = 1,
        X86_64 = 2,
        AARCH32 = 3,
        AARCH64 = 4,
        WASM = 5,
        OTHER = 6,
    }
}

impl HcArchitecture {
    /// Architecture this binary was compiled for
    pub fn current() -> Self {
        if cfg!(target_arch = "x86") {
            Self::X86
        } else if cfg!(target_arch = "x86_64") {
            Self::X86_64
        } else if cfg!(target_arch = "arm") {
            Self::AARCH32
        } else if cfg!(target_arch = "aarch64") {
            Self::AARCH64
        } else if cfg!(target_arch = "wasm32") {
            Self::WASM
        } else {
            Self::OTHER
        }
    }
}

c_enum! {
    pub struct HcOperatingSystem {
        UNKNOWN = 0,
        LINUX = 1,
        WINDOWS = 2,
        MACOS = 3,
        FREEBSD = 4,
        ANDROID = 5,
        IOS = 6,
        WEB = 7,
        OTHER = 8,
    }
}

impl HcOperatingSystem {
    /// Operating system this binary was compiled for
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Self::ANDROID
        } else if cfg!(target_os = "linux") {
            Self::LINUX
        } else if cfg!(target_os = "windows") {
            Self::WINDOWS
        } else if cfg!(target_os = "macos") {
            Self::MACOS
        } else if cfg!(target_os = "freebsd") {
            Self::FREEBSD
        } else if cfg!(target_os = "ios") {
            Self::IOS
        } else if cfg!(target_family = "wasm") {
            Self::WEB
        } else {
            Self::OTHER
        }
    }
}

c_enum! {
    pub struct HcDriveMode {
        /// Not yet set
        NULL = 0,
        /// The core does everything itself; only input comes from the frontend
        SELF_DRIVEN = 1,
        /// As `SELF_DRIVEN`, but audio is pushed to the frontend
        SELF_DRIVEN_EXCEPT_AUDIO = 2,
        /// The frontend calls the core's run-frame callback
        FRONTEND_DRIVEN = 3,
    }
}

c_enum! {
    pub struct HcStructureType {
        CORE_INFO = 1,
        HOST_INFO = 2,
        VIDEO_INFO = 3,
        AUDIO_INFO = 4,
        IMAGE_DATA = 5,
        AUDIO_DATA = 6,
        CORE_DESTROY_INFO = 7,
        CORE_RESET_INFO = 8,
        GET_INPUT_REQUEST = 9,
        LOCK_REQUEST = 10,
        CORE_RUN_STATE_INFO = 11,
        CONTENT_INFO = 12,
        CALLBACKS = 13,
        CONTENT_LOAD_INFO = 14,
        ENVIRONMENT_INFO = 15,
    }
}

c_enum! {
    pub struct HcOpenGlVersion {
        NOT_SUPPORTED = 0,
        V1_0 = api_version(1, 0),
        V1_1 = api_version(1, 1),
        V1_2 = api_version(1, 2),
        V1_3 = api_version(1, 3),
        V1_4 = api_version(1, 4),
        V1_5 = api_version(1, 5),
        V2_0 = api_version(2, 0),
        V2_1 = api_version(2, 1),
        V3_0 = api_version(3, 0),
        V3_1 = api_version(3, 1),
        V3_2 = api_version(3, 2),
        V3_3 = api_version(3, 3),
        V4_0 = api_version(4, 0),
        V4_1 = api_version(4, 1),
        V4_2 = api_version(4, 2),
        V4_3 = api_version(4, 3),
        V4_4 = api_version(4, 4),
        V4_5 = api_version(4, 5),
        V4_6 = api_version(4, 6),
    }
}

c_enum! {
    pub struct HcOpenGlEsVersion {
        NOT_SUPPORTED = 0,
        V1_0 = api_version(1, 0),
        V1_1 = api_version(1, 1),
        V2_0 = api_version(2, 0),
        V3_0 = api_version(3, 0),
        V3_1 = api_version(3, 1),
        V3_2 = api_version(3, 2),
    }
}

c_enum! {
    /// WebGL versions are plain integers, not packed
    pub struct HcWebGlVersion {
        NOT_SUPPORTED = 0,
        V1_0 = 1,
        V2_0 = 2,
    }
}

c_enum! {
    pub struct HcVulkanVersion {
        NOT_SUPPORTED = 0,
        V1_0 = api_version(1, 0),
        V1_1 = api_version(1, 1),
        V1_2 = api_version(1, 2),
        V1_3 = api_version(1, 3),
    }
}

c_enum! {
    pub struct HcMetalVersion {
        NOT_SUPPORTED = 0,
        V1_0 = api_version(1, 0),
        V2_0 = api_version(2, 0),
        V3_0 = api_version(3, 0),
    }
}

c_enum! {
    /// Direct3D versions are sequential, not packed
    pub struct HcDirect3DVersion {
        NOT_SUPPORTED = 0,
        V7_0 = 1,
        V8_0 = 2,
        V9_0 = 3,
        V10_0 = 4,
        V11_0 = 5,
        V12_0 = 6,
    }
}

c_enum! {
    pub struct HcRendererType {
        NULL = 0,
        SOFTWARE = 1,
        OPENGL = 2,
        OPENGL_ES = 3,
        WEBGL = 4,
        VULKAN = 5,
        METAL = 6,
        DIRECT3D = 7,
    }
}

c_enum! {
    pub struct HcAudioFormat {
        NULL = 0,
        U8_PCM = 1,
        S8_PCM = 2,
        S16_PCM = 3,
        S24_PCM = 4,
        S32_PCM = 5,
        FLOAT32 = 6,
        FLOAT64 = 7,
    }
}

c_enum! {
    /// The value is the channel count
    pub struct HcAudioChannels {
        NULL = 0,
        MONO = 1,
        STEREO = 2,
        SURROUND_3_1 = 4,
        SURROUND_5_1 = 6,
        SURROUND_7_1 = 8,
    }
}

c_enum! {
    pub struct HcResetType {
        /// Usually equivalent to pressing the console's reset button
        SOFT = 1,
        /// Usually equivalent to power cycling the console
        HARD = 2,
    }
}

c_enum! {
    /// This revision defines no concrete input kinds yet; frontends key input
    /// values by the raw value a core asks for.
    pub struct HcInputType {
        NULL = 0,
    }
}

c_enum! {
    pub struct HcRunState {
        NULL = 0,
        RUNNING = 1,
        PAUSED = 2,
        /// Terminal; the core will not be resumed
        QUIT = 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_type_values() {
        assert_eq!(HcStructureType::CORE_INFO.0, 1);
        assert_eq!(HcStructureType::LOCK_REQUEST.0, 10);
        assert_eq!(HcStructureType::ENVIRONMENT_INFO.0, 15);
        assert_eq!(HcStructureType::ALL.len(), 15);
    }

    #[test]
    fn test_packed_versions() {
        assert_eq!(HcOpenGlVersion::V4_6.0, (4 << 16) | 6);
        assert_eq!(HcVulkanVersion::V1_3.0, 0x0001_0003);
        assert_eq!(split_api_version(HcOpenGlEsVersion::V3_2.0), (3, 2));
        assert_eq!(HcDirect3DVersion::V12_0.0, 6);
        assert_eq!(HcWebGlVersion::V2_0.0, 2);
    }

    #[test]
    fn test_unknown_values_are_representable() {
        let future = HcStructureType(1000);
        assert!(!future.is_known());
        assert_eq!(format!("{:?}", future), "HcStructureType(1000)");
        assert_eq!(
            format!("{:?}", HcPixelFormat::RGB565),
            "HcPixelFormat::RGB565"
        );
    }

    #[test]
    fn test_audio_channel_values_are_counts() {
        assert_eq!(HcAudioChannels::SURROUND_5_1.0, 6);
        assert_eq!(HcAudioChannels::SURROUND_7_1.0, 8);
    }
}
