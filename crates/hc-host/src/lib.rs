//! Host runtime for hydra cores
//!
//! Loads a core library, hands it the host functions and drives it:
//! - [`library`]: opening a core and calling its exports
//! - [`host_functions`]: the functions a core imports from the host
//! - [`runner`]: the create/run/quit lifecycle
//! - [`audio`], [`video`], [`input`]: what the host functions feed

pub mod audio;
pub mod callbacks;
pub mod context;
pub mod host_functions;
pub mod input;
pub mod library;
pub mod runner;
pub mod sync;
pub mod video;

pub use audio::AudioQueue;
pub use callbacks::RegisteredCallbacks;
pub use context::{host_context, HostContext};
pub use host_functions::resolve_host_symbol;
pub use input::InputState;
pub use library::{CoreExports, CoreLibrary, CORE_EXPORT_NAMES};
pub use runner::CoreRunner;
pub use sync::{LockDomain, SharedState};
pub use video::{Frame, FrameSink};
