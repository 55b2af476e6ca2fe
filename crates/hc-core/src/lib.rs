//! Foundational crate for hydra
//!
//! This crate provides the error type, configuration and logging
//! infrastructure shared by the ABI, the host runtime and cores.

pub mod config;
pub mod error;
pub mod logging;

pub use config::Config;
pub use error::{HydraError, Result};

/// Major version of the frozen core ABI
pub const HYDRA_CORE_MAJOR: u32 = 0;
/// Minor version of the frozen core ABI
pub const HYDRA_CORE_MINOR: u32 = 1;
/// Patch version of the frozen core ABI
pub const HYDRA_CORE_PATCH: u32 = 0;

/// ABI version as `(major, minor, patch)`
pub const fn abi_version() -> (u32, u32, u32) {
    (HYDRA_CORE_MAJOR, HYDRA_CORE_MINOR, HYDRA_CORE_PATCH)
}
