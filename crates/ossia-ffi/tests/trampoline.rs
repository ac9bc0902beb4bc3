//! Drives deletion notifications through the C trampoline, the way libossia
//! would, with an in-memory tree standing in for the native side.

use std::collections::HashMap;
use std::ptr;
use std::sync::{Arc, Mutex};

use ossia_core::{create_node, Boundary, DeletionNotifier, Session, ValueType};
use ossia_ffi::dispatch::{self, Slot};
use ossia_tree::{EndpointId, LocalArray, LocalDevice, LocalString, NodeId};

/// Forwards everything to a `LocalDevice` except deletion registrations,
/// which go through the dispatch table as they do with libossia.
#[derive(Debug)]
struct Relay {
    device: LocalDevice,
    slots: Mutex<HashMap<NodeId, Vec<Slot>>>,
}

impl Relay {
    /// Delete `node` natively and invoke the C callback for it.
    fn delete(&self, node: NodeId) {
        assert!(self.device.delete(node));
        let slots = self.slots.lock().unwrap().remove(&node).unwrap_or_default();
        for slot in slots {
            dispatch::on_node_deleted(slot.as_context(), ptr::null_mut());
        }
    }
}

impl Boundary for Relay {
    type Node = NodeId;
    type Endpoint = EndpointId;
    type Token = Slot;
    type NativeString = LocalString;
    type NodeArray = LocalArray;

    fn add_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.device.add_child(parent, name)
    }
    fn remove_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.device.remove_child(parent, child)
    }
    fn node_name(&self, node: NodeId) -> Option<LocalString> {
        self.device.node_name(node)
    }
    fn free_string(&self, name: LocalString) {
        self.device.free_string(name)
    }
    fn child_count(&self, node: NodeId) -> usize {
        self.device.child_count(node)
    }
    fn child_at(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.device.child_at(node, index)
    }
    fn endpoint(&self, node: NodeId) -> Option<EndpointId> {
        self.device.endpoint(node)
    }
    fn create_endpoint(&self, node: NodeId, value_type: ValueType) -> Option<EndpointId> {
        self.device.create_endpoint(node, value_type)
    }
    fn remove_endpoint(&self, node: NodeId, endpoint: EndpointId) -> bool {
        self.device.remove_endpoint(node, endpoint)
    }
    fn create_node(&self, root: NodeId, path: &str) -> Option<NodeId> {
        self.device.create_node(root, path)
    }
    fn find_node(&self, root: NodeId, path: &str) -> Option<NodeId> {
        self.device.find_node(root, path)
    }
    fn find_pattern(&self, root: NodeId, pattern: &str) -> Option<LocalArray> {
        self.device.find_pattern(root, pattern)
    }
    fn create_pattern(&self, root: NodeId, pattern: &str) -> Option<LocalArray> {
        self.device.create_pattern(root, pattern)
    }
    fn free_node_array(&self, array: LocalArray) {
        self.device.free_node_array(array)
    }

    fn add_deleting_callback(&self, node: NodeId, notifier: DeletionNotifier) -> Option<Slot> {
        let slot = dispatch::stash(notifier);
        self.slots.lock().unwrap().entry(node).or_default().push(slot);
        Some(slot)
    }

    fn remove_deleting_callback(&self, node: NodeId, token: Slot) -> bool {
        if let Some(slots) = self.slots.lock().unwrap().get_mut(&node) {
            slots.retain(|&s| s != token);
        }
        dispatch::discard(token)
    }
}

fn session() -> Arc<Session<Relay>> {
    Session::new(Relay {
        device: LocalDevice::new("relay"),
        slots: Mutex::default(),
    })
}

#[test]
fn test_callback_invalidates_handle() {
    let session = session();
    let root = session.wrap(Some(session.boundary().device.root()));
    let node = create_node(&root, "/a").unwrap();
    let id = node.identity().unwrap();
    assert!(node.is_valid());

    session.boundary().delete(id);
    assert!(!node.is_valid());
    assert_eq!(node.identity(), None);
    assert_eq!(node.name(), None);
}

#[test]
fn test_release_discards_pending_slot() {
    let session = session();
    let root = session.wrap(Some(session.boundary().device.root()));
    let node = create_node(&root, "/b").unwrap();
    let id = node.identity().unwrap();
    node.release();
    assert!(session.boundary().slots.lock().unwrap()[&id].is_empty());

    // A callback arriving after release finds nothing.
    session.boundary().delete(id);
    assert!(!node.is_valid());
}

#[test]
fn test_late_duplicate_callback_is_harmless() {
    let session = session();
    let root = session.wrap(Some(session.boundary().device.root()));
    let node = create_node(&root, "/c").unwrap();
    let id = node.identity().unwrap();
    let slot = session.boundary().slots.lock().unwrap()[&id][0];

    dispatch::on_node_deleted(slot.as_context(), ptr::null_mut());
    dispatch::on_node_deleted(slot.as_context(), ptr::null_mut());
    assert!(!node.is_valid());
    assert!(!dispatch::deliver(slot));
}
