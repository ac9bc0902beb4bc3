//! Identities and boundary-owned buffers of the in-memory device.

use std::num::NonZeroU64;

use ossia_core::NativeArray;
use serde::Serialize;

/// Identity of a node. Never reused once its node is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(NonZeroU64);

/// Identity of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EndpointId(NonZeroU64);

/// Registration returned by `add_deleting_callback`. Not `Clone`: it is
/// handed back at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct WatchToken(pub(crate) u64);

impl NodeId {
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl EndpointId {
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

/// Monotonic id source; the first id is 1.
#[derive(Debug, Default)]
pub(crate) struct IdSource(u64);

impl IdSource {
    pub(crate) fn next_raw(&mut self) -> NonZeroU64 {
        let id = NonZeroU64::MIN.saturating_add(self.0);
        self.0 += 1;
        id
    }

    pub(crate) fn node(&mut self) -> NodeId {
        NodeId(self.next_raw())
    }

    pub(crate) fn endpoint(&mut self) -> EndpointId {
        EndpointId(self.next_raw())
    }
}

/// A node name lent out by the device until `free_string`.
#[derive(Debug)]
pub struct LocalString(pub(crate) String);

impl AsRef<[u8]> for LocalString {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// A node array lent out by the device until `free_node_array`.
#[derive(Debug)]
pub struct LocalArray(pub(crate) Vec<NodeId>);

impl NativeArray<NodeId> for LocalArray {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn get(&self, index: usize) -> Option<NodeId> {
        self.0.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_source_starts_at_one() {
        let mut ids = IdSource::default();
        assert_eq!(ids.node().get(), 1);
        assert_eq!(ids.endpoint().get(), 2);
        assert_eq!(ids.node().get(), 3);
    }

    #[test]
    fn test_local_array_bounds() {
        let mut ids = IdSource::default();
        let a = ids.node();
        let array = LocalArray(vec![a]);
        assert_eq!(array.len(), 1);
        assert_eq!(array.get(0), Some(a));
        assert_eq!(array.get(1), None);
        assert!(!array.is_empty());
    }
}
