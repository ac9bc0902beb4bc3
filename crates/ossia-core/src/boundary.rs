//! The foreign calls the proxy layer makes into a native tree.
//!
//! Everything here is implemented by the native collaborator. Identities are
//! opaque and `Copy`; "null" is expressed as `None`. Strings and node arrays
//! returned by the boundary stay owned by it until handed back through
//! [`Boundary::free_string`] / [`Boundary::free_node_array`].

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::registry::DeletionNotifier;

/// Data type of a value endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Float,
    Int,
    Vec2f,
    Vec3f,
    Vec4f,
    Impulse,
    Bool,
    String,
    List,
    Char,
}

impl ValueType {
    pub const ALL: [ValueType; 10] = [
        ValueType::Float,
        ValueType::Int,
        ValueType::Vec2f,
        ValueType::Vec3f,
        ValueType::Vec4f,
        ValueType::Impulse,
        ValueType::Bool,
        ValueType::String,
        ValueType::List,
        ValueType::Char,
    ];

    /// Ordinal used by the native C enum.
    pub fn to_raw(self) -> i32 {
        self as i32
    }

    pub fn from_raw(raw: i32) -> Option<Self> {
        usize::try_from(raw).ok().and_then(|i| Self::ALL.get(i).copied())
    }
}

/// A bounded, boundary-owned sequence of node identities.
///
/// `get` must return `None` for `index >= len()` and for null entries.
pub trait NativeArray<N> {
    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Option<N>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Calls into the native address-space tree.
///
/// Implementations must tolerate a call that races a deletion of the node it
/// names: such a call may fail but must not crash.
pub trait Boundary: Send + Sync + 'static {
    type Node: Copy + Eq + Hash + Debug + Send + Sync + 'static;
    type Endpoint: Copy + Eq + Debug + Send + Sync + 'static;
    type Token: Debug + Send + Sync + 'static;
    type NativeString: AsRef<[u8]>;
    type NodeArray: NativeArray<Self::Node>;

    // Node lifecycle
    fn add_child(&self, parent: Self::Node, name: &str) -> Option<Self::Node>;
    fn remove_child(&self, parent: Self::Node, child: Self::Node) -> bool;

    // Introspection
    fn node_name(&self, node: Self::Node) -> Option<Self::NativeString>;
    fn free_string(&self, name: Self::NativeString);
    fn child_count(&self, node: Self::Node) -> usize;
    fn child_at(&self, node: Self::Node, index: usize) -> Option<Self::Node>;

    // Endpoints
    fn endpoint(&self, node: Self::Node) -> Option<Self::Endpoint>;
    fn create_endpoint(&self, node: Self::Node, value_type: ValueType) -> Option<Self::Endpoint>;
    fn remove_endpoint(&self, node: Self::Node, endpoint: Self::Endpoint) -> bool;

    // Paths
    fn create_node(&self, root: Self::Node, path: &str) -> Option<Self::Node>;
    fn find_node(&self, root: Self::Node, path: &str) -> Option<Self::Node>;

    // Patterns
    fn find_pattern(&self, root: Self::Node, pattern: &str) -> Option<Self::NodeArray>;
    fn create_pattern(&self, root: Self::Node, pattern: &str) -> Option<Self::NodeArray>;
    fn free_node_array(&self, array: Self::NodeArray);

    /// Install a deletion notification for `node`.
    ///
    /// The boundary calls [`DeletionNotifier::notify`] exactly once, when the
    /// native node is destroyed, unless the registration is removed first.
    fn add_deleting_callback(
        &self,
        node: Self::Node,
        notifier: DeletionNotifier,
    ) -> Option<Self::Token>;

    fn remove_deleting_callback(&self, node: Self::Node, token: Self::Token) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_raw_round_trip() {
        for ty in ValueType::ALL {
            assert_eq!(ValueType::from_raw(ty.to_raw()), Some(ty));
        }
        assert_eq!(ValueType::from_raw(-1), None);
        assert_eq!(ValueType::from_raw(10), None);
    }

    #[test]
    fn test_value_type_serde_names() {
        assert_eq!(serde_json::to_string(&ValueType::Vec3f).unwrap(), "\"vec3f\"");
        let ty: ValueType = serde_json::from_str("\"impulse\"").unwrap();
        assert_eq!(ty, ValueType::Impulse);
    }
}
