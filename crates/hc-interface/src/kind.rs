//! Interface kinds and sets of them

use bitflags::bitflags;

/// Every interface a core can implement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceType {
    IBase,
    IFrontendDriven,
    ISelfDriven,
    ISoftwareRendered,
    IOpenGlRendered,
    IAudio,
    IInput,
    ISaveState,
    IMultiplayer,
    ILog,
    IReadableMemory,
    IRewind,
    ICheat,
}

impl InterfaceType {
    pub const COUNT: usize = 13;

    pub const ALL: [InterfaceType; Self::COUNT] = [
        InterfaceType::IBase,
        InterfaceType::IFrontendDriven,
        InterfaceType::ISelfDriven,
        InterfaceType::ISoftwareRendered,
        InterfaceType::IOpenGlRendered,
        InterfaceType::IAudio,
        InterfaceType::IInput,
        InterfaceType::ISaveState,
        InterfaceType::IMultiplayer,
        InterfaceType::ILog,
        InterfaceType::IReadableMemory,
        InterfaceType::IRewind,
        InterfaceType::ICheat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InterfaceType::IBase => "IBase",
            InterfaceType::IFrontendDriven => "IFrontendDriven",
            InterfaceType::ISelfDriven => "ISelfDriven",
            InterfaceType::ISoftwareRendered => "ISoftwareRendered",
            InterfaceType::IOpenGlRendered => "IOpenGlRendered",
            InterfaceType::IAudio => "IAudio",
            InterfaceType::IInput => "IInput",
            InterfaceType::ISaveState => "ISaveState",
            InterfaceType::IMultiplayer => "IMultiplayer",
            InterfaceType::ILog => "ILog",
            InterfaceType::IReadableMemory => "IReadableMemory",
            InterfaceType::IRewind => "IRewind",
            InterfaceType::ICheat => "ICheat",
        }
    }
}

bitflags! {
    /// Set of interface kinds, one bit per [`InterfaceType`] in declaration order
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InterfaceSet: u16 {
        const BASE             = 1 << 0;
        const FRONTEND_DRIVEN  = 1 << 1;
        const SELF_DRIVEN      = 1 << 2;
        const SOFTWARE_RENDERED = 1 << 3;
        const OPENGL_RENDERED  = 1 << 4;
        const AUDIO            = 1 << 5;
        const INPUT            = 1 << 6;
        const SAVE_STATE       = 1 << 7;
        const MULTIPLAYER      = 1 << 8;
        const LOG              = 1 << 9;
        const READABLE_MEMORY  = 1 << 10;
        const REWIND           = 1 << 11;
        const CHEAT            = 1 << 12;
    }
}

impl From<InterfaceType> for InterfaceSet {
    fn from(kind: InterfaceType) -> Self {
        InterfaceSet::from_bits_truncate(1 << kind as u16)
    }
}

impl InterfaceSet {
    pub fn of(kinds: &[InterfaceType]) -> Self {
        kinds
            .iter()
            .fold(InterfaceSet::empty(), |set, &kind| set | kind.into())
    }

    pub fn has(&self, kind: InterfaceType) -> bool {
        self.contains(kind.into())
    }

    /// Kinds in the set, in declaration order
    pub fn kinds(&self) -> impl Iterator<Item = InterfaceType> + '_ {
        InterfaceType::ALL.into_iter().filter(move |&k| self.has(k))
    }
}
