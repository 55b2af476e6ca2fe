//! Capability-query interfaces for hydra cores
//!
//! Every core implements [`IBase`]; everything else is an optional mixin. A
//! core registers the mixins it implements with [`hydra_class!`], and callers
//! ask for them through [`HydraClass::has_interface`] or the typed `as_*`
//! casts, which return `None` for interfaces the core does not have.
//!
//! ```
//! use std::path::Path;
//! use hc_interface::{hydra_class, CoreHandle, IBase, IRewind, InterfaceType, Size};
//!
//! #[derive(Default)]
//! struct Tape {
//!     frames: u32,
//! }
//!
//! impl IBase for Tape {
//!     fn load_file(&mut self, _content_type: &str, _path: &Path) -> bool { true }
//!     fn reset(&mut self) { self.frames = 0 }
//!     fn native_size(&self) -> Size { Size::new(256, 240) }
//!     fn set_output_size(&mut self, _size: Size) {}
//! }
//!
//! impl IRewind for Tape {
//!     fn rewind_frame(&mut self) { self.frames = self.frames.saturating_sub(1) }
//!     fn rewind_frame_count(&self) -> u32 { 60 }
//!     fn set_rewind_frame_count(&mut self, _count: u32) -> bool { false }
//! }
//!
//! hydra_class!(Tape: IRewind);
//!
//! let mut core = CoreHandle::new(Tape { frames: 3 });
//! assert!(core.has_interface(InterfaceType::IRewind));
//! assert!(core.as_audio().is_none());
//! core.as_rewind().unwrap().rewind_frame();
//! ```

pub mod class;
pub mod handle;
pub mod interfaces;
pub mod kind;
pub mod types;

pub use class::HydraClass;
pub use handle::{CoreFactory, CoreHandle};
pub use interfaces::*;
pub use kind::{InterfaceSet, InterfaceType};
pub use types::*;
