//! Process-wide table of pending deletion notifiers.
//!
//! libossia calls back through a plain function pointer with a `void*`
//! context. The context is a slot number in this table, never a pointer to
//! Rust memory, so a late or duplicated callback finds nothing and does
//! nothing.

use std::collections::HashMap;
use std::ffi::c_void;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use ossia_core::DeletionNotifier;
use tracing::{trace, warn};

static NEXT_SLOT: AtomicUsize = AtomicUsize::new(1);

fn pending_table() -> MutexGuard<'static, HashMap<usize, DeletionNotifier>> {
    static PENDING: OnceLock<Mutex<HashMap<usize, DeletionNotifier>>> = OnceLock::new();
    PENDING
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Slot number handed to C as callback context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot(usize);

impl Slot {
    pub fn as_context(self) -> *mut c_void {
        self.0 as *mut c_void
    }

    pub fn from_context(ctx: *mut c_void) -> Self {
        Slot(ctx as usize)
    }
}

/// Park `notifier` until the node dies or the registration is removed.
pub fn stash(notifier: DeletionNotifier) -> Slot {
    let slot = NEXT_SLOT.fetch_add(1, Ordering::Relaxed);
    pending_table().insert(slot, notifier);
    Slot(slot)
}

/// Drop the notifier in `slot` without firing it.
pub fn discard(slot: Slot) -> bool {
    pending_table().remove(&slot.0).is_some()
}

/// Fire the notifier in `slot`, at most once.
pub fn deliver(slot: Slot) -> bool {
    let notifier = pending_table().remove(&slot.0);
    match notifier {
        Some(notifier) => {
            trace!(slot = slot.0, "delivering node deletion");
            notifier.notify();
            true
        }
        None => false,
    }
}

/// Notifiers waiting for a callback.
pub fn pending() -> usize {
    pending_table().len()
}

/// The `ossia_node_callback_t` installed for every registration.
pub extern "C" fn on_node_deleted(ctx: *mut c_void, _node: *mut c_void) {
    let slot = Slot::from_context(ctx);
    if catch_unwind(AssertUnwindSafe(|| deliver(slot))).is_err() {
        warn!(slot = slot.0, "panic while delivering node deletion");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn test_slot_context_round_trip() {
        let slot = Slot(42);
        assert_eq!(Slot::from_context(slot.as_context()), slot);
    }

    #[test]
    fn test_unknown_context_is_ignored() {
        on_node_deleted(Slot(usize::MAX).as_context(), ptr::null_mut());
        assert!(!deliver(Slot(usize::MAX)));
        assert!(!discard(Slot(usize::MAX)));
    }
}
