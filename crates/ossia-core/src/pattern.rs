//! Bulk lookup and creation through address patterns.
//!
//! No matches, a failed boundary call and an invalid root all produce an
//! empty `Vec`.

use tracing::debug;

use crate::boundary::Boundary;
use crate::handle::NodeHandle;
use crate::lease::Lease;

/// Handles for every node under `root` matching `pattern`.
pub fn find_pattern<B: Boundary>(root: &NodeHandle<B>, pattern: &str) -> Vec<NodeHandle<B>> {
    expand(root, pattern, Expansion::Find)
}

/// Like [`find_pattern`], creating the nodes the pattern can name.
pub fn create_pattern<B: Boundary>(root: &NodeHandle<B>, pattern: &str) -> Vec<NodeHandle<B>> {
    expand(root, pattern, Expansion::Create)
}

#[derive(Debug, Clone, Copy)]
enum Expansion {
    Find,
    Create,
}

fn expand<B: Boundary>(root: &NodeHandle<B>, pattern: &str, mode: Expansion) -> Vec<NodeHandle<B>> {
    let Some(node) = root.identity() else {
        return Vec::new();
    };
    let boundary = root.boundary();
    let raw = match mode {
        Expansion::Find => boundary.find_pattern(node, pattern),
        Expansion::Create => boundary.create_pattern(node, pattern),
    };
    let Some(raw) = raw else {
        debug!(root = ?node, pattern, ?mode, "pattern expansion failed");
        return Vec::new();
    };
    let buffer = Lease::nodes(boundary, raw);
    let handles: Vec<NodeHandle<B>> = buffer
        .decode()
        .into_iter()
        .map(|id| root.session().wrap(Some(id)))
        .collect();
    drop(buffer);
    handles
}
