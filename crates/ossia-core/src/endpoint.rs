use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::boundary::{Boundary, ValueType};

/// Local reference to the value endpoint attached to a node.
///
/// Shared through `Arc`, so every caller asking a handle for its endpoint
/// gets the same object. Typed value access belongs to the endpoint layer.
pub struct Endpoint<B: Boundary> {
    id: B::Endpoint,
    value_type: Option<ValueType>,
    updating: AtomicBool,
}

impl<B: Boundary> Endpoint<B> {
    pub(crate) fn new(id: B::Endpoint, value_type: Option<ValueType>) -> Self {
        Self {
            id,
            value_type,
            updating: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> B::Endpoint {
        self.id
    }

    /// Type requested at creation; `None` when the endpoint pre-existed.
    pub fn value_type(&self) -> Option<ValueType> {
        self.value_type
    }

    pub fn is_updating(&self) -> bool {
        self.updating.load(Ordering::Acquire)
    }

    pub fn set_updating(&self, updating: bool) {
        self.updating.store(updating, Ordering::Release);
    }
}

impl<B: Boundary> fmt::Debug for Endpoint<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("id", &self.id)
            .field("value_type", &self.value_type)
            .field("updating", &self.is_updating())
            .finish()
    }
}
