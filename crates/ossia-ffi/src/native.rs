//! [`Boundary`] over a linked libossia.

use std::ffi::{c_char, CStr};
use std::ptr::{self, NonNull};

use ossia_core::{Boundary, DeletionNotifier, NativeArray, ValueType};
use tracing::debug;

use crate::dispatch::{self, Slot};
use crate::error::{c_index, c_string, FfiError};
use crate::sys;

/// A non-null `ossia_node_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawNode(NonNull<std::ffi::c_void>);

// libossia nodes are shared across its network threads; the library guards
// its own tree.
unsafe impl Send for RawNode {}
unsafe impl Sync for RawNode {}

impl RawNode {
    /// # Safety
    /// `node` must be null or a node obtained from libossia.
    pub unsafe fn from_raw(node: sys::ossia_node_t) -> Option<Self> {
        NonNull::new(node).map(RawNode)
    }

    pub fn as_raw(self) -> sys::ossia_node_t {
        self.0.as_ptr()
    }
}

/// A non-null `ossia_address_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAddress(NonNull<std::ffi::c_void>);

unsafe impl Send for RawAddress {}
unsafe impl Sync for RawAddress {}

/// Name string owned by libossia until `ossia_string_free`.
#[derive(Debug)]
pub struct OssiaString(NonNull<c_char>);

impl AsRef<[u8]> for OssiaString {
    fn as_ref(&self) -> &[u8] {
        // SAFETY: libossia returns NUL-terminated strings that stay valid
        // until freed, and freeing consumes `self`.
        unsafe { CStr::from_ptr(self.0.as_ptr()) }.to_bytes()
    }
}

/// Node array owned by libossia until `ossia_node_array_free`.
#[derive(Debug)]
pub struct OssiaNodeArray {
    data: *mut sys::ossia_node_t,
    len: usize,
}

impl NativeArray<RawNode> for OssiaNodeArray {
    fn len(&self) -> usize {
        if self.data.is_null() {
            0
        } else {
            self.len
        }
    }

    fn get(&self, index: usize) -> Option<RawNode> {
        if index >= self.len() {
            return None;
        }
        // SAFETY: `index < len` and the array is live until freed.
        unsafe { RawNode::from_raw(*self.data.add(index)) }
    }
}

/// Deletion registration: libossia's callback index plus our dispatch slot.
#[derive(Debug)]
pub struct Registration {
    index: NonNull<std::ffi::c_void>,
    slot: Slot,
}

unsafe impl Send for Registration {}
unsafe impl Sync for Registration {}

/// Calls into libossia's C API.
#[derive(Debug, Default)]
pub struct OssiaBoundary {
    _private: (),
}

impl OssiaBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_c_string<T>(&self, op: &'static str, text: &str, f: impl FnOnce(*const c_char) -> T) -> Option<T> {
        match c_string(text) {
            Ok(text) => Some(f(text.as_ptr())),
            Err(err) => {
                debug!(op, %err, "argument not representable in C");
                None
            }
        }
    }

    fn expand(
        &self,
        root: RawNode,
        pattern: &str,
        call: unsafe extern "C" fn(sys::ossia_node_t, *const c_char, *mut *mut sys::ossia_node_t, *mut usize),
    ) -> Option<OssiaNodeArray> {
        self.with_c_string("pattern", pattern, |pattern| {
            let mut data = ptr::null_mut();
            let mut len = 0usize;
            // SAFETY: out-parameters point at live locals.
            unsafe { call(root.as_raw(), pattern, &mut data, &mut len) };
            OssiaNodeArray { data, len }
        })
    }
}

impl Boundary for OssiaBoundary {
    type Node = RawNode;
    type Endpoint = RawAddress;
    type Token = Registration;
    type NativeString = OssiaString;
    type NodeArray = OssiaNodeArray;

    fn add_child(&self, parent: RawNode, name: &str) -> Option<RawNode> {
        self.with_c_string("add_child", name, |name| unsafe {
            RawNode::from_raw(sys::ossia_node_add_child(parent.as_raw(), name))
        })
        .flatten()
    }

    fn remove_child(&self, parent: RawNode, child: RawNode) -> bool {
        unsafe { sys::ossia_node_remove_child(parent.as_raw(), child.as_raw()) };
        true
    }

    fn node_name(&self, node: RawNode) -> Option<OssiaString> {
        let name = unsafe { sys::ossia_node_get_name(node.as_raw()) };
        NonNull::new(name.cast_mut()).map(OssiaString)
    }

    fn free_string(&self, name: OssiaString) {
        unsafe { sys::ossia_string_free(name.0.as_ptr()) };
    }

    fn child_count(&self, node: RawNode) -> usize {
        let count = unsafe { sys::ossia_node_child_size(node.as_raw()) };
        usize::try_from(count).unwrap_or(0)
    }

    fn child_at(&self, node: RawNode, index: usize) -> Option<RawNode> {
        let index = c_index(index)
            .map_err(|err: FfiError| debug!(%err, "child index rejected"))
            .ok()?;
        unsafe { RawNode::from_raw(sys::ossia_node_get_child(node.as_raw(), index)) }
    }

    fn endpoint(&self, node: RawNode) -> Option<RawAddress> {
        let address = unsafe { sys::ossia_node_get_address(node.as_raw()) };
        NonNull::new(address).map(RawAddress)
    }

    fn create_endpoint(&self, node: RawNode, value_type: ValueType) -> Option<RawAddress> {
        let address = unsafe { sys::ossia_node_create_address(node.as_raw(), value_type.to_raw()) };
        NonNull::new(address).map(RawAddress)
    }

    fn remove_endpoint(&self, node: RawNode, endpoint: RawAddress) -> bool {
        unsafe { sys::ossia_node_remove_address(node.as_raw(), endpoint.0.as_ptr()) };
        true
    }

    fn create_node(&self, root: RawNode, path: &str) -> Option<RawNode> {
        self.with_c_string("create_node", path, |path| unsafe {
            RawNode::from_raw(sys::ossia_node_create(root.as_raw(), path))
        })
        .flatten()
    }

    fn find_node(&self, root: RawNode, path: &str) -> Option<RawNode> {
        self.with_c_string("find_node", path, |path| unsafe {
            RawNode::from_raw(sys::ossia_node_find(root.as_raw(), path))
        })
        .flatten()
    }

    fn find_pattern(&self, root: RawNode, pattern: &str) -> Option<OssiaNodeArray> {
        self.expand(root, pattern, sys::ossia_node_find_pattern)
    }

    fn create_pattern(&self, root: RawNode, pattern: &str) -> Option<OssiaNodeArray> {
        self.expand(root, pattern, sys::ossia_node_create_pattern)
    }

    fn free_node_array(&self, array: OssiaNodeArray) {
        if !array.data.is_null() {
            unsafe { sys::ossia_node_array_free(array.data) };
        }
    }

    fn add_deleting_callback(&self, node: RawNode, notifier: DeletionNotifier) -> Option<Registration> {
        let slot = dispatch::stash(notifier);
        let index = unsafe {
            sys::ossia_node_add_deleting_callback(
                node.as_raw(),
                dispatch::on_node_deleted,
                slot.as_context(),
            )
        };
        match NonNull::new(index) {
            Some(index) => Some(Registration { index, slot }),
            None => {
                dispatch::discard(slot);
                None
            }
        }
    }

    fn remove_deleting_callback(&self, node: RawNode, token: Registration) -> bool {
        unsafe { sys::ossia_node_remove_deleting_callback(node.as_raw(), token.index.as_ptr()) };
        dispatch::discard(token.slot)
    }
}
