//! Interface registration
//!
//! [`hydra_class!`](crate::hydra_class) implements [`HydraClass`] from the list
//! of interfaces a type implements. Listed interfaces answer `true` and cast
//! to `Some`; everything else answers `false` and casts to `None`.
//!
//! A core that implements [`IBase`] without registering does not compile:
//!
//! ```compile_fail
//! use std::path::Path;
//! use hc_interface::{IBase, Size};
//!
//! struct Unregistered;
//!
//! impl IBase for Unregistered {
//!     fn load_file(&mut self, _: &str, _: &Path) -> bool { false }
//!     fn reset(&mut self) {}
//!     fn native_size(&self) -> Size { Size::default() }
//!     fn set_output_size(&mut self, _: Size) {}
//! }
//! ```
//!
//! Neither does listing an interface the type does not implement:
//!
//! ```compile_fail
//! use std::path::Path;
//! use hc_interface::{hydra_class, IBase, Size};
//!
//! struct Liar;
//!
//! impl IBase for Liar {
//!     fn load_file(&mut self, _: &str, _: &Path) -> bool { false }
//!     fn reset(&mut self) {}
//!     fn native_size(&self) -> Size { Size::default() }
//!     fn set_output_size(&mut self, _: Size) {}
//! }
//!
//! hydra_class!(Liar: IAudio);
//! ```

use crate::interfaces::*;
use crate::kind::{InterfaceSet, InterfaceType};

/// Interface query and typed casts of a core
pub trait HydraClass {
    /// Interfaces the type registered, always including `IBase`
    fn interfaces(&self) -> InterfaceSet;

    fn has_interface(&self, kind: InterfaceType) -> bool {
        self.interfaces().has(kind)
    }

    fn as_base(&mut self) -> Option<&mut dyn IBase>;

    fn as_frontend_driven(&mut self) -> Option<&mut dyn IFrontendDriven> {
        None
    }

    fn as_self_driven(&mut self) -> Option<&mut dyn ISelfDriven> {
        None
    }

    fn as_software_rendered(&mut self) -> Option<&mut dyn ISoftwareRendered> {
        None
    }

    fn as_opengl_rendered(&mut self) -> Option<&mut dyn IOpenGlRendered> {
        None
    }

    fn as_audio(&mut self) -> Option<&mut dyn IAudio> {
        None
    }

    fn as_input(&mut self) -> Option<&mut dyn IInput> {
        None
    }

    fn as_save_state(&mut self) -> Option<&mut dyn ISaveState> {
        None
    }

    fn as_multiplayer(&mut self) -> Option<&mut dyn IMultiplayer> {
        None
    }

    fn as_log(&mut self) -> Option<&mut dyn ILog> {
        None
    }

    fn as_readable_memory(&mut self) -> Option<&mut dyn IReadableMemory> {
        None
    }

    fn as_rewind(&mut self) -> Option<&mut dyn IRewind> {
        None
    }

    fn as_cheat(&mut self) -> Option<&mut dyn ICheat> {
        None
    }
}

/// Register the interfaces a core implements.
///
/// ```ignore
/// hydra_class!(MyCore: IFrontendDriven, ISoftwareRendered, IAudio);
/// ```
///
/// `IBase` is always registered and may be omitted from the list.
#[macro_export]
macro_rules! hydra_class {
    ($ty:ty $(: $($iface:ident),* $(,)?)?) => {
        impl $crate::HydraClass for $ty {
            fn interfaces(&self) -> $crate::InterfaceSet {
                $crate::InterfaceSet::of(&[
                    $crate::InterfaceType::IBase,
                    $($($crate::InterfaceType::$iface,)*)?
                ])
            }

            fn as_base(&mut self) -> ::std::option::Option<&mut dyn $crate::IBase> {
                ::std::option::Option::Some(self)
            }

            $($($crate::__hydra_cast!($iface);)*)?
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __hydra_cast {
    (IBase) => {};
    (IFrontendDriven) => {
        $crate::__hydra_cast!(@cast as_frontend_driven, IFrontendDriven);
    };
    (ISelfDriven) => {
        $crate::__hydra_cast!(@cast as_self_driven, ISelfDriven);
    };
    (ISoftwareRendered) => {
        $crate::__hydra_cast!(@cast as_software_rendered, ISoftwareRendered);
    };
    (IOpenGlRendered) => {
        $crate::__hydra_cast!(@cast as_opengl_rendered, IOpenGlRendered);
    };
    (IAudio) => {
        $crate::__hydra_cast!(@cast as_audio, IAudio);
    };
    (IInput) => {
        $crate::__hydra_cast!(@cast as_input, IInput);
    };
    (ISaveState) => {
        $crate::__hydra_cast!(@cast as_save_state, ISaveState);
    };
    (IMultiplayer) => {
        $crate::__hydra_cast!(@cast as_multiplayer, IMultiplayer);
    };
    (ILog) => {
        $crate::__hydra_cast!(@cast as_log, ILog);
    };
    (IReadableMemory) => {
        $crate::__hydra_cast!(@cast as_readable_memory, IReadableMemory);
    };
    (IRewind) => {
        $crate::__hydra_cast!(@cast as_rewind, IRewind);
    };
    (ICheat) => {
        $crate::__hydra_cast!(@cast as_cheat, ICheat);
    };
    (@cast $method:ident, $iface:ident) => {
        fn $method(&mut self) -> ::std::option::Option<&mut dyn $crate::$iface> {
            ::std::option::Option::Some(self)
        }
    };
}
