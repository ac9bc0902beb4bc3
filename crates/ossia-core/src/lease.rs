//! Scoped ownership of boundary-allocated buffers.

use std::ops::Deref;

use crate::boundary::{Boundary, NativeArray};

/// Holds a boundary-owned value and hands it back on drop.
///
/// Every exit path, early returns included, releases the buffer exactly once.
pub(crate) struct Lease<'b, B: Boundary, T> {
    boundary: &'b B,
    raw: Option<T>,
    release: fn(&B, T),
}

impl<'b, B: Boundary, T> Lease<'b, B, T> {
    pub(crate) fn new(boundary: &'b B, raw: T, release: fn(&B, T)) -> Self {
        Self {
            boundary,
            raw: Some(raw),
            release,
        }
    }
}

impl<'b, B: Boundary> Lease<'b, B, B::NativeString> {
    pub(crate) fn string(boundary: &'b B, raw: B::NativeString) -> Self {
        Self::new(boundary, raw, B::free_string)
    }

    /// Copy the native bytes into an owned string.
    pub(crate) fn to_owned_string(&self) -> String {
        let bytes: &[u8] = (**self).as_ref();
        String::from_utf8_lossy(bytes).into_owned()
    }
}

impl<'b, B: Boundary> Lease<'b, B, B::NodeArray> {
    pub(crate) fn nodes(boundary: &'b B, raw: B::NodeArray) -> Self {
        Self::new(boundary, raw, B::free_node_array)
    }

    /// Decode the bounded view into owned identities, skipping null entries.
    pub(crate) fn decode(&self) -> Vec<B::Node> {
        let array: &B::NodeArray = self;
        (0..array.len()).filter_map(|i| array.get(i)).collect()
    }
}

impl<B: Boundary, T> Deref for Lease<'_, B, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.raw {
            Some(raw) => raw,
            // `raw` is only taken in `drop`.
            None => unreachable!("lease used after release"),
        }
    }
}

impl<B: Boundary, T> Drop for Lease<'_, B, T> {
    fn drop(&mut self) {
        if let Some(raw) = self.raw.take() {
            (self.release)(self.boundary, raw);
        }
    }
}
