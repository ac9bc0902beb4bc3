use std::fmt;
use std::sync::Arc;

use crate::boundary::Boundary;
use crate::handle::NodeHandle;
use crate::registry::HandleRegistry;
use crate::shared::NodeTable;

/// One boundary plus the dispatch table for the handles created over it.
///
/// Handles of one session on the same native node share its endpoint and
/// updating flag. Every [`NodeHandle`] keeps its session alive.
pub struct Session<B: Boundary> {
    boundary: B,
    registry: Arc<HandleRegistry>,
    nodes: Arc<NodeTable<B>>,
}

impl<B: Boundary> Session<B> {
    pub fn new(boundary: B) -> Arc<Self> {
        Arc::new(Self {
            boundary,
            registry: Arc::new(HandleRegistry::new()),
            nodes: Arc::new(NodeTable::new()),
        })
    }

    pub fn boundary(&self) -> &B {
        &self.boundary
    }

    pub fn registry(&self) -> &Arc<HandleRegistry> {
        &self.registry
    }

    /// Wrap a raw identity, e.g. a device root, in a handle.
    ///
    /// `None` yields an invalid handle.
    pub fn wrap(self: &Arc<Self>, node: Option<B::Node>) -> NodeHandle<B> {
        NodeHandle::wrap(self, node)
    }

    pub(crate) fn nodes(&self) -> &Arc<NodeTable<B>> {
        &self.nodes
    }

    /// Handles still registered for deletion notifications.
    pub fn live_handles(&self) -> usize {
        self.registry.len()
    }

    /// Distinct native nodes with at least one valid handle.
    pub fn tracked_nodes(&self) -> usize {
        self.nodes.len()
    }
}

impl<B: Boundary + fmt::Debug> fmt::Debug for Session<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("boundary", &self.boundary)
            .field("registry", &self.registry)
            .field("tracked_nodes", &self.tracked_nodes())
            .finish()
    }
}
