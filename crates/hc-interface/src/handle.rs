//! Owned core instances and the create/destroy/info triple

use std::ops::{Deref, DerefMut};

use hc_abi::CoreInfo;
use tracing::debug;

use crate::interfaces::IBase;
use crate::kind::InterfaceType;
use crate::types::InfoType;

/// An owned core, used through its base interface.
///
/// Only types implementing [`IBase`], and therefore registered with
/// [`hydra_class!`](crate::hydra_class), can be wrapped.
pub struct CoreHandle {
    core: Box<dyn IBase + Send>,
}

impl CoreHandle {
    pub fn new<T: IBase + Send + 'static>(core: T) -> Self {
        let handle = Self {
            core: Box::new(core),
        };
        debug!(
            "Core handle created with interfaces {:?}",
            handle.core.interfaces().kinds().map(InterfaceType::name).collect::<Vec<_>>()
        );
        handle
    }
}

impl Deref for CoreHandle {
    type Target = dyn IBase + Send;

    fn deref(&self) -> &Self::Target {
        self.core.as_ref()
    }
}

impl DerefMut for CoreHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.core.as_mut()
    }
}

type CreateFn = Box<dyn Fn() -> CoreHandle + Send + Sync>;

/// How a frontend obtains cores written against the interfaces: create,
/// destroy and static info.
pub struct CoreFactory {
    create: CreateFn,
    info: CoreInfo,
}

impl CoreFactory {
    pub fn new<F>(info: CoreInfo, create: F) -> Self
    where
        F: Fn() -> CoreHandle + Send + Sync + 'static,
    {
        Self {
            create: Box::new(create),
            info,
        }
    }

    pub fn create_emulator(&self) -> CoreHandle {
        (self.create)()
    }

    pub fn destroy_emulator(&self, core: CoreHandle) {
        drop(core);
        debug!("Core handle destroyed");
    }

    /// Metadata by key, `None` when the core does not provide it
    pub fn get_info(&self, key: InfoType) -> Option<String> {
        key.read(&self.info)
    }

    pub fn core_info(&self) -> &CoreInfo {
        &self.info
    }
}
