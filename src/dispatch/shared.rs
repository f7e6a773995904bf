//! A registry that can be shared between threads

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use super::chain::EntryId;
use super::registry::{DispatchError, DispatchKey, PatternDispatchRegistry};

/// Cloneable handle to a [`PatternDispatchRegistry`] behind a read-write lock.
///
/// Lookups return snapshots, so handlers can be invoked without holding the
/// lock and registrations made meanwhile are not seen by the snapshot.
pub struct SharedRegistry<H> {
    inner: Arc<RwLock<PatternDispatchRegistry<H>>>,
}

impl<H> Clone for SharedRegistry<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H> Default for SharedRegistry<H> {
    fn default() -> Self {
        Self::from(PatternDispatchRegistry::new())
    }
}

impl<H> From<PatternDispatchRegistry<H>> for SharedRegistry<H> {
    fn from(registry: PatternDispatchRegistry<H>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }
}

impl<H> SharedRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        key: DispatchKey,
        handler: H,
        priority: i64,
    ) -> Result<EntryId, DispatchError> {
        self.inner.write().register(key, handler, priority)
    }

    pub fn unregister(&self, key: &DispatchKey, id: EntryId) -> Option<H> {
        self.inner.write().unregister(key, id)
    }

    /// Hold the read lock for direct access to the registry
    pub fn read(&self) -> RwLockReadGuard<'_, PatternDispatchRegistry<H>> {
        self.inner.read()
    }
}

impl<H: Clone> SharedRegistry<H> {
    /// Snapshot of the handlers that apply to `candidate`, in dispatch order
    pub fn flatten(&self, candidate: &str) -> Vec<H> {
        self.inner.read().flatten(candidate).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clones_share_state() {
        let registry = SharedRegistry::new();
        let other = registry.clone();
        registry
            .register(DispatchKey::exact("hei"), "X".to_string(), 0)
            .unwrap();
        assert_eq!(other.flatten("hei"), vec!["X".to_string()]);
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_changes() {
        let registry = SharedRegistry::new();
        let id = registry.register(DispatchKey::exact("k"), 1, 0).unwrap();
        let snapshot = registry.flatten("k");

        registry.unregister(&DispatchKey::exact("k"), id);
        registry.register(DispatchKey::exact("k"), 2, 0).unwrap();

        assert_eq!(snapshot, vec![1]);
        assert_eq!(registry.flatten("k"), vec![2]);
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = SharedRegistry::new();
        let workers: Vec<_> = (0..4i64)
            .map(|n| {
                let registry = registry.clone();
                thread::spawn(move || {
                    registry
                        .register(DispatchKey::pattern("job"), n, n)
                        .unwrap();
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(registry.flatten("job-1"), vec![3, 2, 1, 0]);
        assert_eq!(registry.read().len(), 1);
    }

    #[test]
    fn test_invalid_pattern_through_handle() {
        let registry: SharedRegistry<u8> = SharedRegistry::new();
        assert!(registry.register(DispatchKey::pattern("["), 0, 0).is_err());
        assert!(registry.read().is_empty());
    }
}
