//! Value types shared by the interfaces

use hc_abi::CoreInfo;

/// Dimensions of a video frame in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Opaque save state produced by a core
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaveState {
    pub data: Vec<u8>,
}

impl SaveState {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Where a core's log message should go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTarget {
    Warning,
    Error,
    Debug,
    Info,
    VerboseI,
    VerboseII,
    VerboseIII,
    VerboseIV,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SampleType {
    #[default]
    Int16,
    Float,
}

impl SampleType {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleType::Int16 => 2,
            SampleType::Float => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelType {
    Mono,
    #[default]
    Stereo,
}

impl ChannelType {
    pub fn count(self) -> usize {
        match self {
            ChannelType::Mono => 1,
            ChannelType::Stereo => 2,
        }
    }
}

/// Controller inputs a core can poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ButtonType {
    Keypad1Up,
    Keypad1Down,
    Keypad1Left,
    Keypad1Right,
    Keypad2Up,
    Keypad2Down,
    Keypad2Left,
    Keypad2Right,
    A,
    B,
    X,
    Y,
    Z,
    L1,
    R1,
    L2,
    R2,
    L3,
    R3,
    Start,
    Select,
    Touch,
    Analog1Up,
    Analog1Down,
    Analog1Left,
    Analog1Right,
    Analog2Up,
    Analog2Down,
    Analog2Left,
    Analog2Right,
}

impl ButtonType {
    /// Number of buttons
    pub const COUNT: usize = 30;

    pub const ALL: [ButtonType; Self::COUNT] = [
        ButtonType::Keypad1Up,
        ButtonType::Keypad1Down,
        ButtonType::Keypad1Left,
        ButtonType::Keypad1Right,
        ButtonType::Keypad2Up,
        ButtonType::Keypad2Down,
        ButtonType::Keypad2Left,
        ButtonType::Keypad2Right,
        ButtonType::A,
        ButtonType::B,
        ButtonType::X,
        ButtonType::Y,
        ButtonType::Z,
        ButtonType::L1,
        ButtonType::R1,
        ButtonType::L2,
        ButtonType::R2,
        ButtonType::L3,
        ButtonType::R3,
        ButtonType::Start,
        ButtonType::Select,
        ButtonType::Touch,
        ButtonType::Analog1Up,
        ButtonType::Analog1Down,
        ButtonType::Analog1Left,
        ButtonType::Analog1Right,
        ButtonType::Analog2Up,
        ButtonType::Analog2Down,
        ButtonType::Analog2Left,
        ButtonType::Analog2Right,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn is_analog(self) -> bool {
        self.index() >= ButtonType::Analog1Up.index()
    }
}

/// Keys of the per-core metadata a frontend may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoType {
    CoreName,
    SystemName,
    Description,
    Author,
    Version,
    License,
    Website,
    Extensions,
    Firmware,
    IconData,
    IconWidth,
    IconHeight,
}

impl InfoType {
    pub const ALL: [InfoType; 12] = [
        InfoType::CoreName,
        InfoType::SystemName,
        InfoType::Description,
        InfoType::Author,
        InfoType::Version,
        InfoType::License,
        InfoType::Website,
        InfoType::Extensions,
        InfoType::Firmware,
        InfoType::IconData,
        InfoType::IconWidth,
        InfoType::IconHeight,
    ];

    /// Textual value of this key in `info`.
    ///
    /// `Extensions` joins the extensions of every loadable content kind.
    /// `Firmware` has no counterpart in [`CoreInfo`] and `IconData` has no
    /// textual form, both read as `None`.
    pub fn read(self, info: &CoreInfo) -> Option<String> {
        let text = |s: &str| (!s.is_empty()).then(|| s.to_string());
        match self {
            InfoType::CoreName => text(&info.core_name),
            InfoType::SystemName => text(&info.system_name),
            InfoType::Description => text(&info.description),
            InfoType::Author => text(&info.author),
            InfoType::Version => text(&info.core_version),
            InfoType::License => text(&info.license),
            InfoType::Website => text(&info.website),
            InfoType::Extensions => {
                let all: Vec<&str> = info
                    .loadable_content
                    .iter()
                    .map(|c| c.extensions.as_str())
                    .filter(|e| !e.is_empty())
                    .collect();
                text(&all.join(","))
            }
            InfoType::Firmware | InfoType::IconData => None,
            InfoType::IconWidth => info.icon.as_ref().map(|i| i.width.to_string()),
            InfoType::IconHeight => info.icon.as_ref().map(|i| i.height.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hc_abi::{ContentInfo, Icon, PixelFormat};

    #[test]
    fn test_button_indices() {
        assert_eq!(ButtonType::ALL.len(), ButtonType::COUNT);
        for (i, button) in ButtonType::ALL.iter().enumerate() {
            assert_eq!(button.index(), i);
        }
        assert_eq!(ButtonType::from_index(8), Some(ButtonType::A));
        assert_eq!(ButtonType::from_index(ButtonType::COUNT), None);
        assert!(ButtonType::Analog2Right.is_analog());
        assert!(!ButtonType::Touch.is_analog());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(SampleType::default(), SampleType::Int16);
        assert_eq!(ChannelType::default().count(), 2);
        assert_eq!(Size::new(160, 144).area(), 23040);
    }

    #[test]
    fn test_info_read() {
        let info = CoreInfo {
            core_name: "Pattern".into(),
            core_version: "1.2".into(),
            loadable_content: vec![
                ContentInfo {
                    extensions: "gb".into(),
                    ..Default::default()
                },
                ContentInfo {
                    extensions: "gbc".into(),
                    ..Default::default()
                },
            ],
            icon: Some(Icon {
                width: 16,
                height: 8,
                format: PixelFormat::Rgba32,
                data: vec![0; 16 * 8 * 4],
            }),
            ..Default::default()
        };
        assert_eq!(InfoType::CoreName.read(&info).as_deref(), Some("Pattern"));
        assert_eq!(InfoType::Version.read(&info).as_deref(), Some("1.2"));
        assert_eq!(InfoType::Author.read(&info), None);
        assert_eq!(InfoType::Extensions.read(&info).as_deref(), Some("gb,gbc"));
        assert_eq!(InfoType::IconWidth.read(&info).as_deref(), Some("16"));
        assert_eq!(InfoType::Firmware.read(&info), None);
    }
}
