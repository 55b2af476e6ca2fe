//! C ABI between hydra frontends and dynamically loaded cores
//!
//! This crate provides:
//! - The frozen enumerations and `repr(C)` structures
//! - Structure chain traversal and construction
//! - Function pointer types and the host function loader
//! - Core-side export glue ([`core_export!`])

pub mod chain;
pub mod enums;
pub mod export;
pub mod host;
pub mod loader;
pub mod model;
pub mod raw;
pub mod result;
pub mod run_state;

pub use chain::{ChainBuilder, ChainEntry, ExtensionChain};
pub use export::{CoreModule, CoreSlot};
pub use host::HostBindings;
pub use loader::{HostBindingsBuilder, HOST_FUNCTION_NAMES};
pub use model::*;
pub use result::HcResult;
pub use run_state::RunStateCell;
