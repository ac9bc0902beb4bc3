//! Dispatch table for native deletion notifications.
//!
//! The native side is never handed a pointer to proxy state. Each handle is
//! registered under a [`CallbackKey`]; the boundary gets a
//! [`DeletionNotifier`] carrying that key, and firing it looks the key up
//! here. Slots hold weak references only, and registration tokens stay with
//! their handle.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::trace;

/// Receives the deletion of the native node behind a handle.
pub(crate) trait Invalidate: Send + Sync {
    fn node_deleted(&self);
}

/// Lookup key passed across the boundary as callback context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackKey(u64);

impl CallbackKey {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Default)]
pub struct HandleRegistry {
    next_key: AtomicU64,
    slots: Mutex<BTreeMap<u64, Weak<dyn Invalidate>>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, target: Weak<dyn Invalidate>) -> CallbackKey {
        let key = self.next_key.fetch_add(1, Ordering::Relaxed).saturating_add(1);
        self.slots().insert(key, target);
        CallbackKey(key)
    }

    pub(crate) fn forget(&self, key: CallbackKey) -> bool {
        self.slots().remove(&key.0).is_some()
    }

    /// Route a deletion notification to the handle registered under `key`.
    ///
    /// Returns `false` when the key is unknown, already dispatched, or its
    /// handle is gone.
    pub fn dispatch(&self, key: CallbackKey) -> bool {
        // The slot lock must be released before the handle runs its cleanup.
        let target = self.slots().remove(&key.0);
        match target.and_then(|weak| weak.upgrade()) {
            Some(target) => {
                trace!(key = key.0, "dispatching node deletion");
                target.node_deleted();
                true
            }
            None => false,
        }
    }

    /// Number of handles currently waiting for a deletion notification.
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn notifier(self: &Arc<Self>, key: CallbackKey) -> DeletionNotifier {
        DeletionNotifier {
            registry: Arc::downgrade(self),
            key,
        }
    }

    fn slots(&self) -> MutexGuard<'_, BTreeMap<u64, Weak<dyn Invalidate>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for HandleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleRegistry")
            .field("live", &self.len())
            .finish()
    }
}

/// Single-use capability handed to the boundary with each registration.
///
/// Consumed by [`notify`](Self::notify), so one registration can invalidate
/// its handle at most once.
#[derive(Debug)]
pub struct DeletionNotifier {
    registry: Weak<HandleRegistry>,
    key: CallbackKey,
}

impl DeletionNotifier {
    pub fn key(&self) -> CallbackKey {
        self.key
    }

    /// Report that the native node was destroyed.
    pub fn notify(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.dispatch(self.key),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl Invalidate for Counter {
        fn node_deleted(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn register(registry: &Arc<HandleRegistry>, counter: &Arc<Counter>) -> CallbackKey {
        let weak: Weak<Counter> = Arc::downgrade(counter);
        registry.insert(weak)
    }

    #[test]
    fn test_keys_are_distinct_and_nonzero() {
        let registry = Arc::new(HandleRegistry::new());
        let counter = Arc::new(Counter::default());
        let a = register(&registry, &counter);
        let b = register(&registry, &counter);
        assert_ne!(a, b);
        assert!(a.get() > 0 && b.get() > 0);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_dispatch_fires_once() {
        let registry = Arc::new(HandleRegistry::new());
        let counter = Arc::new(Counter::default());
        let key = register(&registry, &counter);
        assert!(registry.dispatch(key));
        assert!(!registry.dispatch(key));
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_forgotten_key_does_not_dispatch() {
        let registry = Arc::new(HandleRegistry::new());
        let counter = Arc::new(Counter::default());
        let key = register(&registry, &counter);
        assert!(registry.forget(key));
        assert!(!registry.notifier(key).notify());
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_notifier_outliving_registry() {
        let registry = Arc::new(HandleRegistry::new());
        let counter = Arc::new(Counter::default());
        let notifier = registry.notifier(register(&registry, &counter));
        drop(registry);
        assert!(!notifier.notify());
    }

    #[test]
    fn test_dropped_target_is_skipped() {
        let registry = Arc::new(HandleRegistry::new());
        let counter = Arc::new(Counter::default());
        let key = register(&registry, &counter);
        drop(counter);
        assert!(!registry.dispatch(key));
    }
}
