//! Proxy handles over native nodes.
//!
//! A [`NodeHandle`] is valid while its native node exists. It goes invalid
//! once, either when the boundary reports the node destroyed or when the
//! handle is released or dropped, and stays invalid. Every operation on an
//! invalid handle is a no-op returning an empty value.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, trace, warn};

use crate::boundary::{Boundary, ValueType};
use crate::endpoint::Endpoint;
use crate::lease::Lease;
use crate::registry::{CallbackKey, Invalidate};
use crate::session::Session;
use crate::shared::{NodeShared, NodeTable};
use crate::updating;

struct Registration<B: Boundary> {
    key: CallbackKey,
    token: B::Token,
}

struct Slots<B: Boundary> {
    identity: Option<B::Node>,
    shared: Option<Arc<NodeShared<B>>>,
    registration: Option<Registration<B>>,
}

/// What a successful invalidation took out of the handle.
struct Teardown<B: Boundary> {
    identity: Option<B::Node>,
    registration: Option<Registration<B>>,
}

pub(crate) struct HandleState<B: Boundary> {
    live: AtomicBool,
    table: Arc<NodeTable<B>>,
    slots: Mutex<Slots<B>>,
}

impl<B: Boundary> HandleState<B> {
    fn new(table: &Arc<NodeTable<B>>, identity: Option<B::Node>) -> Self {
        Self {
            live: AtomicBool::new(identity.is_some()),
            table: Arc::clone(table),
            slots: Mutex::new(Slots {
                identity,
                shared: identity.map(|node| table.acquire(node)),
                registration: None,
            }),
        }
    }

    fn slots(&self) -> MutexGuard<'_, Slots<B>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Valid -> Invalid. Only the first caller gets the teardown.
    fn invalidate(&self) -> Option<Teardown<B>> {
        let (teardown, shared) = {
            let mut slots = self.slots();
            if !self.live.swap(false, Ordering::AcqRel) {
                return None;
            }
            let identity = slots.identity.take();
            let shared = slots.shared.take();
            let registration = slots.registration.take();
            (
                Teardown {
                    identity,
                    registration,
                },
                shared,
            )
        };
        if let (Some(node), Some(shared)) = (teardown.identity, shared) {
            self.table.release(node, shared);
        }
        Some(teardown)
    }

    fn identity(&self) -> Option<B::Node> {
        self.slots().identity
    }

    /// Run `f` on the node's shared state; `None` once invalid.
    fn with_shared<R>(&self, f: impl FnOnce(&NodeShared<B>) -> R) -> Option<R> {
        self.slots().shared.as_deref().map(f)
    }
}

impl<B: Boundary> Invalidate for HandleState<B> {
    fn node_deleted(&self) {
        // The fired notification used up the registration; nothing to hand back.
        if let Some(teardown) = self.invalidate() {
            trace!(node = ?teardown.identity, "native node deleted, handle invalidated");
        }
    }
}

/// Proxy for one native node.
///
/// Handles are not cached: each navigation call returns a fresh handle with
/// its own deletion registration. Dropping a handle releases it.
pub struct NodeHandle<B: Boundary> {
    session: Arc<Session<B>>,
    state: Arc<HandleState<B>>,
}

impl<B: Boundary> NodeHandle<B> {
    pub(crate) fn wrap(session: &Arc<Session<B>>, node: Option<B::Node>) -> Self {
        let state = Arc::new(HandleState::new(session.nodes(), node));
        let handle = Self {
            session: Arc::clone(session),
            state,
        };
        let Some(node) = node else {
            return handle;
        };

        let state: Weak<HandleState<B>> = Arc::downgrade(&handle.state);
        let key = session.registry().insert(state);
        let notifier = session.registry().notifier(key);
        match session.boundary().add_deleting_callback(node, notifier) {
            Some(token) => {
                let mut slots = handle.state.slots();
                if handle.state.live.load(Ordering::Acquire) {
                    slots.registration = Some(Registration { key, token });
                }
                // Otherwise the node died while registering and the
                // notification already consumed the registration.
            }
            None => {
                warn!(node = ?node, "boundary refused deletion registration");
                session.registry().forget(key);
                handle.state.invalidate();
                return handle;
            }
        }

        if handle.is_valid() && handle.endpoint().is_none() {
            if let Some(endpoint) = session.boundary().endpoint(node) {
                handle
                    .state
                    .with_shared(|shared| shared.install_endpoint(Endpoint::new(endpoint, None)));
            }
        }
        trace!(node = ?node, key = key.get(), "wrapped native node");
        handle
    }

    pub fn session(&self) -> &Arc<Session<B>> {
        &self.session
    }

    pub(crate) fn boundary(&self) -> &B {
        self.session.boundary()
    }

    /// Native identity, or `None` once invalid.
    pub fn identity(&self) -> Option<B::Node> {
        self.state.identity()
    }

    pub fn is_valid(&self) -> bool {
        self.state.live.load(Ordering::Acquire)
    }

    /// Give the deletion registration back and invalidate the handle.
    ///
    /// Idempotent, and a no-op if the node was already deleted.
    pub fn release(&self) {
        let Some(teardown) = self.state.invalidate() else {
            return;
        };
        if let Some(Registration { key, token }) = teardown.registration {
            self.session.registry().forget(key);
            if let Some(node) = teardown.identity {
                self.boundary().remove_deleting_callback(node, token);
            }
        }
    }

    /// Node name copied out of the boundary.
    pub fn name(&self) -> Option<String> {
        let node = self.identity()?;
        let raw = self.boundary().node_name(node)?;
        let name = Lease::string(self.boundary(), raw);
        Some(name.to_owned_string())
    }

    pub fn add_child(&self, name: &str) -> Option<NodeHandle<B>> {
        let node = self.identity()?;
        match self.boundary().add_child(node, name) {
            Some(child) => Some(self.session.wrap(Some(child))),
            None => {
                debug!(node = ?node, name, "boundary refused child creation");
                None
            }
        }
    }

    /// Remove `child` from this node. Returns the boundary's answer.
    pub fn remove_child(&self, child: &NodeHandle<B>) -> bool {
        match (self.identity(), child.identity()) {
            (Some(parent), Some(child)) => self.boundary().remove_child(parent, child),
            _ => false,
        }
    }

    pub fn child_count(&self) -> usize {
        self.identity()
            .map_or(0, |node| self.boundary().child_count(node))
    }

    /// Fresh handle for the child currently at `index`.
    pub fn child_at(&self, index: usize) -> Option<NodeHandle<B>> {
        let node = self.identity()?;
        let child = self.boundary().child_at(node, index)?;
        Some(self.session.wrap(Some(child)))
    }

    /// Live iterator over the children; the tree is re-queried at each step.
    pub fn children(&self) -> Children<'_, B> {
        Children {
            parent: self,
            index: 0,
        }
    }

    /// The node's endpoint. Every handle on the node shares the same one.
    pub fn endpoint(&self) -> Option<Arc<Endpoint<B>>> {
        self.state.with_shared(NodeShared::endpoint).flatten()
    }

    /// Create the node's endpoint, or return the one already held.
    pub fn create_endpoint(&self, value_type: ValueType) -> Option<Arc<Endpoint<B>>> {
        let node = self.identity()?;
        if let Some(existing) = self.endpoint() {
            return Some(existing);
        }
        match self.boundary().create_endpoint(node, value_type) {
            Some(id) => self
                .state
                .with_shared(|shared| shared.install_endpoint(Endpoint::new(id, Some(value_type)))),
            None => {
                debug!(node = ?node, ?value_type, "boundary refused endpoint creation");
                None
            }
        }
    }

    /// Ask the boundary to drop the endpoint, then forget it locally either way.
    pub fn remove_endpoint(&self) -> bool {
        let removed = match (self.identity(), self.endpoint()) {
            (Some(node), Some(endpoint)) => self.boundary().remove_endpoint(node, endpoint.id()),
            _ => false,
        };
        self.state.with_shared(NodeShared::take_endpoint);
        removed
    }

    /// Whether a remote change is being applied to this node. Shared by
    /// every handle on the node; `false` once invalid.
    pub fn is_updating(&self) -> bool {
        self.state
            .with_shared(NodeShared::is_updating)
            .unwrap_or(false)
    }

    /// Mark this subtree as applying a remote change. See [`updating::set_updating`].
    pub fn set_updating(&self, updating: bool) {
        updating::set_updating(self, updating);
    }

    pub(crate) fn record_updating(&self, updating: bool) {
        self.state.with_shared(|shared| shared.set_updating(updating));
    }
}

impl<B: Boundary> Drop for NodeHandle<B> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<B: Boundary> fmt::Debug for NodeHandle<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHandle")
            .field("identity", &self.identity())
            .field("updating", &self.is_updating())
            .finish()
    }
}

/// Iterator returned by [`NodeHandle::children`].
pub struct Children<'a, B: Boundary> {
    parent: &'a NodeHandle<B>,
    index: usize,
}

impl<B: Boundary> Iterator for Children<'_, B> {
    type Item = NodeHandle<B>;

    fn next(&mut self) -> Option<NodeHandle<B>> {
        while self.index < self.parent.child_count() {
            let index = self.index;
            self.index += 1;
            if let Some(child) = self.parent.child_at(index) {
                return Some(child);
            }
        }
        None
    }
}
