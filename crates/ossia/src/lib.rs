//! ossia-rs: node handle proxies over an OSC address-space tree.
//!
//! Re-exports the workspace crates:
//! - [`address`]: address parsing, validation and pattern compilation,
//! - [`proxy`]: the boundary trait, handles, navigation, patterns and the
//!   updating flag,
//! - [`tree`]: an in-memory device implementing the boundary,
//! - [`ffi`]: the libossia binding (`link` feature for the native boundary).

pub use ossia_address as address;
pub use ossia_core as proxy;
pub use ossia_ffi as ffi;
pub use ossia_tree as tree;

pub use ossia_core::{
    create_node, create_pattern, find_node, find_pattern, set_updating, Boundary, Endpoint,
    NodeHandle, Session, ValueType,
};
pub use ossia_tree::LocalDevice;

/// Returns the crate version at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
