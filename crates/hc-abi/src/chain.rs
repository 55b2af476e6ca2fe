//! Structure chains
//!
//! Any ABI structure can point at further structures through its `next`
//! field. A reader walks the chain, dispatches on each node's tag and skips
//! tags it does not understand, so a peer built against a newer revision can
//! attach extensions without breaking older readers.

use std::any::Any;
use std::ffi::c_void;
use std::marker::PhantomData;
use std::ptr;

use tracing::{trace, warn};

use crate::enums::HcStructureType;
use crate::raw::*;

/// Longest chain a reader follows before assuming it is cyclic
pub const MAX_CHAIN_LENGTH: usize = 64;

/// One node of a structure chain
#[derive(Debug, Clone, Copy)]
pub enum ChainEntry<'a> {
    CoreInfo(&'a HcCoreInfo),
    HostInfo(&'a HcHostInfo),
    VideoInfo(&'a HcVideoInfo),
    AudioInfo(&'a HcAudioInfo),
    ImageData(&'a HcImageData),
    AudioData(&'a HcAudioData),
    DestroyInfo(&'a HcDestroyInfo),
    ResetInfo(&'a HcResetInfo),
    InputRequest(&'a HcInputRequest),
    RunStateInfo(&'a HcRunStateInfo),
    ContentInfo(&'a HcContentInfo),
    Callbacks(&'a HcCallbacks),
    ContentLoadInfo(&'a HcContentLoadInfo),
    EnvironmentInfo(&'a HcEnvironmentInfo),
    /// A tag this reader has no structure for, including tags that are
    /// declared but carry no layout yet
    Unknown(HcStructureType),
}

impl ChainEntry<'_> {
    pub fn structure_type(&self) -> HcStructureType {
        match self {
            ChainEntry::CoreInfo(_) => HcStructureType::CORE_INFO,
            ChainEntry::HostInfo(_) => HcStructureType::HOST_INFO,
            ChainEntry::VideoInfo(_) => HcStructureType::VIDEO_INFO,
            ChainEntry::AudioInfo(_) => HcStructureType::AUDIO_INFO,
            ChainEntry::ImageData(_) => HcStructureType::IMAGE_DATA,
            ChainEntry::AudioData(_) => HcStructureType::AUDIO_DATA,
            ChainEntry::DestroyInfo(_) => HcStructureType::CORE_DESTROY_INFO,
            ChainEntry::ResetInfo(_) => HcStructureType::CORE_RESET_INFO,
            ChainEntry::InputRequest(_) => HcStructureType::GET_INPUT_REQUEST,
            ChainEntry::RunStateInfo(_) => HcStructureType::CORE_RUN_STATE_INFO,
            ChainEntry::ContentInfo(_) => HcStructureType::CONTENT_INFO,
            ChainEntry::Callbacks(_) => HcStructureType::CALLBACKS,
            ChainEntry::ContentLoadInfo(_) => HcStructureType::CONTENT_LOAD_INFO,
            ChainEntry::EnvironmentInfo(_) => HcStructureType::ENVIRONMENT_INFO,
            ChainEntry::Unknown(ty) => *ty,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ChainEntry::Unknown(_))
    }
}

/// Iterator over the nodes reachable from a chain head
pub struct ChainIter<'a> {
    cursor: *const HcChainHeader,
    visited: usize,
    _marker: PhantomData<&'a HcChainHeader>,
}

/// Walk the chain starting at `head`, which is included.
///
/// # Safety
/// `head` must be null or point to a valid chainable structure whose `next`
/// pointers are null or point to valid chainable structures, all living for
/// `'a`.
pub unsafe fn walk<'a>(head: *const c_void) -> ChainIter<'a> {
    ChainIter {
        cursor: head as *const HcChainHeader,
        visited: 0,
        _marker: PhantomData,
    }
}

/// Walk the nodes after `first`.
///
/// # Safety
/// Same requirements as [`walk`] for `first.next`.
pub unsafe fn extensions<'a, T: Chainable>(first: &'a T) -> ChainIter<'a> {
    walk(first.header().next)
}

/// Find the first node tagged `T::STRUCTURE_TYPE`.
///
/// # Safety
/// Same requirements as [`walk`]. The header tag is trusted to describe the
/// node's actual layout.
pub unsafe fn find<'a, T: Chainable>(head: *const c_void) -> Option<&'a T> {
    let mut iter = walk(head);
    while let Some(node) = iter.next_header() {
        if node.ty == T::STRUCTURE_TYPE {
            return Some(&*(node as *const HcChainHeader as *const T));
        }
    }
    None
}

impl<'a> ChainIter<'a> {
    fn next_header(&mut self) -> Option<&'a HcChainHeader> {
        if self.cursor.is_null() {
            return None;
        }
        if self.visited >= MAX_CHAIN_LENGTH {
            warn!("structure chain exceeds {} nodes, stopping", MAX_CHAIN_LENGTH);
            self.cursor = ptr::null();
            return None;
        }
        // SAFETY: validity of every reachable node is the caller's promise to `walk`
        let header = unsafe { &*self.cursor };
        self.cursor = header.next as *const HcChainHeader;
        self.visited += 1;
        Some(header)
    }
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = ChainEntry<'a>;

    fn next(&mut self) -> Option<ChainEntry<'a>> {
        let header = self.next_header()?;
        let ptr = header as *const HcChainHeader;

        // SAFETY: the tag identifies the layout of the node
        let entry = unsafe {
            match header.ty {
                HcStructureType::CORE_INFO => ChainEntry::CoreInfo(&*(ptr as *const HcCoreInfo)),
                HcStructureType::HOST_INFO => ChainEntry::HostInfo(&*(ptr as *const HcHostInfo)),
                HcStructureType::VIDEO_INFO => {
                    ChainEntry::VideoInfo(&*(ptr as *const HcVideoInfo))
                }
                HcStructureType::AUDIO_INFO => {
                    ChainEntry::AudioInfo(&*(ptr as *const HcAudioInfo))
                }
                HcStructureType::IMAGE_DATA => {
                    ChainEntry::ImageData(&*(ptr as *const HcImageData))
                }
                HcStructureType::AUDIO_DATA => {
                    ChainEntry::AudioData(&*(ptr as *const HcAudioData))
                }
                HcStructureType::CORE_DESTROY_INFO => {
                    ChainEntry::DestroyInfo(&*(ptr as *const HcDestroyInfo))
                }
                HcStructureType::CORE_RESET_INFO => {
                    ChainEntry::ResetInfo(&*(ptr as *const HcResetInfo))
                }
                HcStructureType::GET_INPUT_REQUEST => {
                    ChainEntry::InputRequest(&*(ptr as *const HcInputRequest))
                }
                HcStructureType::CORE_RUN_STATE_INFO => {
                    ChainEntry::RunStateInfo(&*(ptr as *const HcRunStateInfo))
                }
                HcStructureType::CONTENT_INFO => {
                    ChainEntry::ContentInfo(&*(ptr as *const HcContentInfo))
                }
                HcStructureType::CALLBACKS => ChainEntry::Callbacks(&*(ptr as *const HcCallbacks)),
                HcStructureType::CONTENT_LOAD_INFO => {
                    ChainEntry::ContentLoadInfo(&*(ptr as *const HcContentLoadInfo))
                }
                HcStructureType::ENVIRONMENT_INFO => {
                    ChainEntry::EnvironmentInfo(&*(ptr as *const HcEnvironmentInfo))
                }
                other => {
                    trace!("skipping chain node {:?}", other);
                    ChainEntry::Unknown(other)
                }
            }
        };
        Some(entry)
    }
}

/// Builds a chain of owned nodes.
///
/// Nodes are boxed so their addresses stay fixed while more are pushed; the
/// chain is valid for as long as the builder lives.
#[derive(Default)]
pub struct ChainBuilder {
    nodes: Vec<Box<dyn Any>>,
    headers: Vec<*mut HcChainHeader>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node. Any `next` pointer it carries is replaced.
    pub fn push<T: Chainable + 'static>(mut self, node: T) -> Self {
        let mut boxed = Box::new(node);
        boxed.header_mut().next = ptr::null_mut();
        let header = boxed.header_mut() as *mut HcChainHeader;
        if let Some(&last) = self.headers.last() {
            // SAFETY: `last` points into a box this builder still owns
            unsafe { (*last).next = header as *mut c_void };
        }
        self.headers.push(header);
        self.nodes.push(boxed);
        self
    }

    /// First node of the chain, or null when empty
    pub fn head(&self) -> *mut c_void {
        self.headers
            .first()
            .map_or(ptr::null_mut(), |&h| h as *mut c_void)
    }

    /// Typed access to the `index`-th node
    pub fn get<T: Chainable + 'static>(&self, index: usize) -> Option<&T> {
        self.nodes.get(index)?.downcast_ref::<T>()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attach the built chain to `first`'s `next` field.
    ///
    /// `first` must not outlive the builder if it is read afterwards.
    pub fn attach_to<T: Chainable>(&self, first: &mut T) {
        first.header_mut().next = self.head();
    }
}

/// Owning copy of the structures a peer attached to a chain.
///
/// Only known, pointer-free structures are kept; anything else is reported
/// by tag.
#[derive(Debug, Clone, Default)]
pub struct ExtensionChain {
    entries: Vec<Extension>,
}

#[derive(Debug, Clone, Copy)]
pub enum Extension {
    VideoInfo(HcVideoInfo),
    AudioInfo(HcAudioInfo),
    ResetInfo(HcResetInfo),
    RunStateInfo(HcRunStateInfo),
    InputRequest(HcInputRequest),
    Other(HcStructureType),
}

impl ExtensionChain {
    /// Copy the chain starting at `head`.
    ///
    /// # Safety
    /// Same requirements as [`walk`].
    pub unsafe fn read(head: *const c_void) -> Self {
        let entries = walk(head)
            .map(|entry| match entry {
                ChainEntry::VideoInfo(v) => Extension::VideoInfo(Self::detached(v)),
                ChainEntry::AudioInfo(a) => Extension::AudioInfo(Self::detached(a)),
                ChainEntry::ResetInfo(r) => Extension::ResetInfo(Self::detached(r)),
                ChainEntry::RunStateInfo(r) => Extension::RunStateInfo(Self::detached(r)),
                ChainEntry::InputRequest(i) => Extension::InputRequest(Self::detached(i)),
                other => Extension::Other(other.structure_type()),
            })
            .collect();
        Self { entries }
    }

    fn detached<T: Chainable + Copy>(node: &T) -> T {
        let mut copy = *node;
        copy.header_mut().next = ptr::null_mut();
        copy
    }

    pub fn entries(&self) -> &[Extension] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn video_info(&self) -> Option<&HcVideoInfo> {
        self.entries.iter().find_map(|e| match e {
            Extension::VideoInfo(v) => Some(v),
            _ => None,
        })
    }

    pub fn audio_info(&self) -> Option<&HcAudioInfo> {
        self.entries.iter().find_map(|e| match e {
            Extension::AudioInfo(a) => Some(a),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::*;

    /// A node from a newer revision, with a tag and layout this revision
    /// does not know
    #[repr(C)]
    struct FutureNode {
        ty: HcStructureType,
        next: *mut c_void,
        payload: [u64; 4],
    }

    #[test]
    fn test_walk_empty() {
        let iter = unsafe { walk(ptr::null()) };
        assert_eq!(iter.count(), 0);
    }

    #[test]
    fn test_builder_links_nodes() {
        let chain = ChainBuilder::new()
            .push(HcVideoInfo {
                width: 320,
                ..Default::default()
            })
            .push(HcAudioInfo {
                sample_rate: 44100,
                ..Default::default()
            });
        assert_eq!(chain.len(), 2);

        let types: Vec<_> = unsafe { walk(chain.head()) }
            .map(|e| e.structure_type())
            .collect();
        assert_eq!(
            types,
            vec![HcStructureType::VIDEO_INFO, HcStructureType::AUDIO_INFO]
        );

        let audio = unsafe { find::<HcAudioInfo>(chain.head()) }.unwrap();
        assert_eq!(audio.sample_rate, 44100);
        assert!(unsafe { find::<HcResetInfo>(chain.head()) }.is_none());
        assert_eq!(chain.get::<HcVideoInfo>(0).unwrap().width, 320);
        assert!(chain.get::<HcVideoInfo>(1).is_none());
    }

    #[test]
    fn test_unknown_nodes_are_skipped() {
        let mut tail = HcResetInfo {
            reset_type: HcResetType::SOFT,
            ..Default::default()
        };
        let mut future = FutureNode {
            ty: HcStructureType(4242),
            next: &mut tail as *mut HcResetInfo as *mut c_void,
            payload: [7; 4],
        };
        let mut lock = HcDestroyInfo::default();
        lock.ty = HcStructureType::LOCK_REQUEST;
        lock.next = &mut future as *mut FutureNode as *mut c_void;

        let entries: Vec<_> = unsafe { walk(&lock as *const HcDestroyInfo as *const c_void) }.collect();
        assert_eq!(entries.len(), 3);
        assert!(!entries[0].is_known());
        assert!(!entries[1].is_known());
        assert_eq!(entries[1].structure_type(), HcStructureType(4242));
        match entries[2] {
            ChainEntry::ResetInfo(reset) => assert_eq!(reset.reset_type, HcResetType::SOFT),
            other => panic!("unexpected entry {:?}", other),
        }
        assert_eq!(future.payload[0], 7);
    }

    #[test]
    fn test_cycle_is_cut() {
        let mut a = HcDestroyInfo::default();
        let mut b = HcDestroyInfo::default();
        a.next = &mut b as *mut HcDestroyInfo as *mut c_void;
        b.next = &mut a as *mut HcDestroyInfo as *mut c_void;

        let count = unsafe { walk(&a as *const HcDestroyInfo as *const c_void) }.count();
        assert_eq!(count, MAX_CHAIN_LENGTH);
    }

    #[test]
    fn test_extension_chain_copies() {
        let mut info = HcRunStateInfo {
            run_state: HcRunState::PAUSED,
            ..Default::default()
        };
        let chain = ChainBuilder::new()
            .push(HcVideoInfo {
                height: 144,
                ..Default::default()
            })
            .push(HcContentLoadInfo::default());
        chain.attach_to(&mut info);

        assert_eq!(unsafe { extensions(&info) }.count(), 2);
        let ext = unsafe { ExtensionChain::read(info.next) };
        assert_eq!(ext.entries().len(), 2);
        assert_eq!(ext.video_info().unwrap().height, 144);
        assert!(ext.video_info().unwrap().next.is_null());
        assert!(ext.audio_info().is_none());
        assert!(matches!(
            ext.entries()[1],
            Extension::Other(HcStructureType::CONTENT_LOAD_INFO)
        ));
    }
}
