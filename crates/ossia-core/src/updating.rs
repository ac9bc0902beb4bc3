//! Feedback-suppression flag propagation.
//!
//! While a change that came from the native or remote side is being applied
//! locally, the affected subtree is flagged so local write-back code can tell
//! the change did not originate here and skip re-sending it.

use crate::boundary::Boundary;
use crate::handle::NodeHandle;

/// Set the updating flag on `node`, its endpoint and every descendant.
///
/// Depth-first: the node's endpoint first, then each child (queried live,
/// never cached), then the node itself. No-op on an invalid node.
///
/// The flag lives in the session's per-node state, which only exists while
/// some handle to the node is alive. Descendants nobody holds a handle to
/// are visited through temporary handles, so the flag is gone again by the
/// time a new handle to them is wrapped.
pub fn set_updating<B: Boundary>(node: &NodeHandle<B>, updating: bool) {
    if !node.is_valid() {
        return;
    }
    if let Some(endpoint) = node.endpoint() {
        endpoint.set_updating(updating);
    }
    for child in node.children() {
        set_updating(&child, updating);
    }
    node.record_updating(updating);
}
