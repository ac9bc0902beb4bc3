//! Path-based lookup and creation relative to a root handle.
//!
//! Path syntax belongs to the boundary; these functions pass it through.

use tracing::debug;

use crate::boundary::Boundary;
use crate::handle::NodeHandle;

/// Create the node at `path` under `root`, along with missing ancestors.
pub fn create_node<B: Boundary>(root: &NodeHandle<B>, path: &str) -> Option<NodeHandle<B>> {
    let node = root.identity()?;
    match root.boundary().create_node(node, path) {
        Some(created) => Some(root.session().wrap(Some(created))),
        None => {
            debug!(root = ?node, path, "boundary could not create node");
            None
        }
    }
}

/// Look up the node at `path` under `root`. Never creates.
pub fn find_node<B: Boundary>(root: &NodeHandle<B>, path: &str) -> Option<NodeHandle<B>> {
    let node = root.identity()?;
    let found = root.boundary().find_node(node, path)?;
    Some(root.session().wrap(Some(found)))
}
