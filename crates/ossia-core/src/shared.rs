//! State shared by every handle a session holds on the same native node.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::boundary::Boundary;
use crate::endpoint::Endpoint;

pub(crate) struct NodeShared<B: Boundary> {
    updating: AtomicBool,
    endpoint: Mutex<Option<Arc<Endpoint<B>>>>,
}

impl<B: Boundary> NodeShared<B> {
    fn new() -> Self {
        Self {
            updating: AtomicBool::new(false),
            endpoint: Mutex::new(None),
        }
    }

    fn endpoint_slot(&self) -> MutexGuard<'_, Option<Arc<Endpoint<B>>>> {
        self.endpoint.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn endpoint(&self) -> Option<Arc<Endpoint<B>>> {
        self.endpoint_slot().clone()
    }

    /// Store `endpoint` unless one is already held; returns the held one.
    pub(crate) fn install_endpoint(&self, endpoint: Endpoint<B>) -> Arc<Endpoint<B>> {
        Arc::clone(self.endpoint_slot().get_or_insert_with(|| Arc::new(endpoint)))
    }

    pub(crate) fn take_endpoint(&self) -> Option<Arc<Endpoint<B>>> {
        self.endpoint_slot().take()
    }

    pub(crate) fn is_updating(&self) -> bool {
        self.updating.load(Ordering::Acquire)
    }

    pub(crate) fn set_updating(&self, updating: bool) {
        self.updating.store(updating, Ordering::Release);
    }
}

/// Interning table from native identity to [`NodeShared`].
///
/// Entries live as long as at least one handle holds them.
pub(crate) struct NodeTable<B: Boundary> {
    entries: Mutex<HashMap<B::Node, Weak<NodeShared<B>>>>,
}

impl<B: Boundary> NodeTable<B> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<B::Node, Weak<NodeShared<B>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn acquire(&self, node: B::Node) -> Arc<NodeShared<B>> {
        let mut entries = self.entries();
        if let Some(shared) = entries.get(&node).and_then(Weak::upgrade) {
            return shared;
        }
        let shared = Arc::new(NodeShared::new());
        entries.insert(node, Arc::downgrade(&shared));
        shared
    }

    /// Give back one handle's reference, dropping the entry with the last one.
    pub(crate) fn release(&self, node: B::Node, shared: Arc<NodeShared<B>>) {
        let mut entries = self.entries();
        let last = Arc::strong_count(&shared) == 1;
        drop(shared);
        if last {
            entries.remove(&node);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries().len()
    }
}
