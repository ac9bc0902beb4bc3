//! Proxy handles over a native OSC address-space tree.
//!
//! The native tree is the source of truth and may delete nodes at any time,
//! from any thread. This crate wraps native node identities in
//! [`NodeHandle`]s that stay safe to use after that happens:
//! - [`Boundary`] is the set of foreign calls the proxies make,
//! - [`Session`] pairs a boundary with the [`HandleRegistry`] that routes
//!   deletion notifications back to handles,
//! - [`create_node`] / [`find_node`] navigate by path,
//! - [`find_pattern`] / [`create_pattern`] expand address patterns,
//! - [`set_updating`] flags a subtree while a remote change is applied.

mod boundary;
mod endpoint;
mod handle;
mod lease;
mod navigator;
mod pattern;
mod registry;
mod session;
mod shared;
mod updating;

pub use boundary::{Boundary, NativeArray, ValueType};
pub use endpoint::Endpoint;
pub use handle::{Children, NodeHandle};
pub use navigator::{create_node, find_node};
pub use pattern::{create_pattern, find_pattern};
pub use registry::{CallbackKey, DeletionNotifier, HandleRegistry};
pub use session::Session;
pub use updating::set_updating;

/// Returns the crate version at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
