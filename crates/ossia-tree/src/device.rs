use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use ossia_core::{Boundary, DeletionNotifier, ValueType};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::arena::Arena;
use crate::error::TreeError;
use crate::seed;
use crate::types::{EndpointId, LocalArray, LocalString, NodeId, WatchToken};

/// Snapshot of a device's call accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeviceStats {
    /// Calls made through the [`Boundary`] impl.
    pub boundary_calls: u64,
    pub registrations: u64,
    pub unregistrations: u64,
    /// Deletion notifications delivered.
    pub notifications: u64,
    pub outstanding_strings: u64,
    pub outstanding_arrays: u64,
    pub nodes: u64,
}

#[derive(Debug, Default)]
struct Counters {
    boundary_calls: AtomicU64,
    registrations: AtomicU64,
    unregistrations: AtomicU64,
    notifications: AtomicU64,
    strings_lent: AtomicU64,
    strings_freed: AtomicU64,
    arrays_lent: AtomicU64,
    arrays_freed: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

/// An in-memory address-space tree.
///
/// Implements [`Boundary`] the way a native device would: identities are
/// never reused, names and node arrays are lent out until freed, and removing
/// a node fires the deletion notifications of its whole subtree, parents
/// first. Notifications are delivered with no lock held.
#[derive(Debug)]
pub struct LocalDevice {
    name: String,
    root: NodeId,
    arena: Mutex<Arena>,
    counters: Counters,
}

impl LocalDevice {
    pub fn new(name: impl Into<String>) -> Self {
        let (arena, root) = Arena::new();
        Self {
            name: name.into(),
            root,
            arena: Mutex::new(arena),
            counters: Counters::default(),
        }
    }

    /// Build a device from a nested JSON object.
    ///
    /// Keys are child names and values are objects describing the children;
    /// an `"@type"` key gives the node an endpoint of that [`ValueType`].
    ///
    /// ```
    /// use ossia_tree::LocalDevice;
    /// use serde_json::json;
    ///
    /// let device = LocalDevice::from_json("synth", &json!({
    ///     "filter": { "cutoff": { "@type": "float" } }
    /// })).unwrap();
    /// assert_eq!(device.stats().nodes, 3);
    /// ```
    pub fn from_json(name: impl Into<String>, tree: &Value) -> Result<Self, TreeError> {
        let device = Self::new(name);
        {
            let mut arena = device.arena();
            seed::seed(&mut arena, device.root, tree)?;
        }
        Ok(device)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Remove `node` as a remote peer would, firing the deletion
    /// notifications of its subtree. Returns `false` for the root and for
    /// unknown nodes.
    pub fn delete(&self, node: NodeId) -> bool {
        let result = self.arena().delete(node);
        match result {
            Ok(notifiers) => {
                self.fire(notifiers);
                true
            }
            Err(err) => {
                debug!(node = ?node, %err, "delete refused");
                false
            }
        }
    }

    /// Remove the node at `path` below the root.
    pub fn delete_path(&self, path: &str) -> bool {
        let found = self.arena().resolve(self.root, path);
        match found {
            Ok(node) => self.delete(node),
            Err(err) => {
                debug!(path, %err, "delete refused");
                false
            }
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.arena().contains(node)
    }

    /// Absolute address of `node`, `None` once it is gone.
    pub fn path_of(&self, node: NodeId) -> Option<String> {
        self.arena().path_of(node).ok()
    }

    /// Node at `path` below the root, looked up without counting a call.
    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        self.arena().resolve(self.root, path).ok()
    }

    pub fn endpoint_type(&self, node: NodeId) -> Option<ValueType> {
        self.arena().get(node).ok()?.endpoint.map(|(_, ty)| ty)
    }

    /// Deletion registrations currently installed on `node`.
    pub fn watchers(&self, node: NodeId) -> usize {
        self.arena().get(node).map_or(0, |entry| entry.watcher_count())
    }

    /// The tree in the format accepted by [`from_json`](Self::from_json).
    pub fn snapshot(&self) -> Value {
        let arena = self.arena();
        seed::snapshot(&arena, self.root).unwrap_or(Value::Null)
    }

    pub fn stats(&self) -> DeviceStats {
        let c = &self.counters;
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        DeviceStats {
            boundary_calls: load(&c.boundary_calls),
            registrations: load(&c.registrations),
            unregistrations: load(&c.unregistrations),
            notifications: load(&c.notifications),
            outstanding_strings: load(&c.strings_lent).saturating_sub(load(&c.strings_freed)),
            outstanding_arrays: load(&c.arrays_lent).saturating_sub(load(&c.arrays_freed)),
            nodes: self.arena().len() as u64,
        }
    }

    fn arena(&self) -> MutexGuard<'_, Arena> {
        self.arena.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count a boundary call and run `op` under the arena lock.
    fn call<T>(&self, op: &'static str, f: impl FnOnce(&mut Arena) -> Result<T, TreeError>) -> Option<T> {
        bump(&self.counters.boundary_calls);
        let result = f(&mut *self.arena());
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(op, %err, "boundary call failed");
                None
            }
        }
    }

    fn fire(&self, notifiers: Vec<DeletionNotifier>) {
        for notifier in notifiers {
            bump(&self.counters.notifications);
            notifier.notify();
        }
    }

    fn lend_array(&self, nodes: Vec<NodeId>) -> LocalArray {
        bump(&self.counters.arrays_lent);
        LocalArray(nodes)
    }
}

impl Boundary for LocalDevice {
    type Node = NodeId;
    type Endpoint = EndpointId;
    type Token = WatchToken;
    type NativeString = LocalString;
    type NodeArray = LocalArray;

    fn add_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.call("add_child", |arena| arena.add_child(parent, name))
    }

    fn remove_child(&self, parent: NodeId, child: NodeId) -> bool {
        match self.call("remove_child", |arena| arena.detach(parent, child)) {
            Some(notifiers) => {
                self.fire(notifiers);
                true
            }
            None => false,
        }
    }

    fn node_name(&self, node: NodeId) -> Option<LocalString> {
        let name = self.call("node_name", |arena| Ok(arena.get(node)?.name.clone()))?;
        bump(&self.counters.strings_lent);
        Some(LocalString(name))
    }

    fn free_string(&self, _name: LocalString) {
        bump(&self.counters.boundary_calls);
        bump(&self.counters.strings_freed);
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.call("child_count", |arena| Ok(arena.get(node)?.children.len()))
            .unwrap_or(0)
    }

    fn child_at(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.call("child_at", |arena| arena.child_at(node, index))
            .flatten()
    }

    fn endpoint(&self, node: NodeId) -> Option<EndpointId> {
        self.call("endpoint", |arena| {
            Ok(arena.get(node)?.endpoint.map(|(id, _)| id))
        })
        .flatten()
    }

    fn create_endpoint(&self, node: NodeId, value_type: ValueType) -> Option<EndpointId> {
        self.call("create_endpoint", |arena| {
            arena.create_endpoint(node, value_type)
        })
    }

    fn remove_endpoint(&self, node: NodeId, endpoint: EndpointId) -> bool {
        self.call("remove_endpoint", |arena| {
            arena.remove_endpoint(node, endpoint)
        })
        .is_some()
    }

    fn create_node(&self, root: NodeId, path: &str) -> Option<NodeId> {
        self.call("create_node", |arena| arena.create_path(root, path))
    }

    fn find_node(&self, root: NodeId, path: &str) -> Option<NodeId> {
        self.call("find_node", |arena| arena.resolve(root, path))
    }

    fn find_pattern(&self, root: NodeId, pattern: &str) -> Option<LocalArray> {
        let nodes = self.call("find_pattern", |arena| arena.find_pattern(root, pattern))?;
        Some(self.lend_array(nodes))
    }

    fn create_pattern(&self, root: NodeId, pattern: &str) -> Option<LocalArray> {
        let nodes = self.call("create_pattern", |arena| {
            arena.create_pattern(root, pattern)
        })?;
        Some(self.lend_array(nodes))
    }

    fn free_node_array(&self, _array: LocalArray) {
        bump(&self.counters.boundary_calls);
        bump(&self.counters.arrays_freed);
    }

    fn add_deleting_callback(&self, node: NodeId, notifier: DeletionNotifier) -> Option<WatchToken> {
        let token = self.call("add_deleting_callback", |arena| {
            arena.watch(node, notifier)
        })?;
        bump(&self.counters.registrations);
        Some(token)
    }

    fn remove_deleting_callback(&self, node: NodeId, token: WatchToken) -> bool {
        bump(&self.counters.unregistrations);
        self.call("remove_deleting_callback", |arena| {
            arena.unwatch(node, token)
        })
        .unwrap_or(false)
    }
}
