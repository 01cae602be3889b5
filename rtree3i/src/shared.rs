use parking_lot::RwLock;

use crate::errors::RTreeResult;
use crate::rtree_map::RTreeMap;

/// A cell publishing the current version of an [`RTreeMap`] to many
/// threads.
///
/// Readers take a snapshot and query it without holding any lock. Writers
/// compute a new version from the current one and publish it; concurrent
/// writers are serialized by the cell. The maps themselves are never
/// modified.
///
/// # Examples
///
/// ```rust
/// use rtree3i::{BoundingBox, RTreeMap, SharedRTreeMap};
///
/// let shared = SharedRTreeMap::new(RTreeMap::create(Default::default()));
/// shared.update(|map| map.put(BoundingBox::point(1, 2, 3), "here")).unwrap();
///
/// let snapshot = shared.snapshot();
/// assert_eq!(snapshot.get(&BoundingBox::point(1, 2, 3)), Some(&"here"));
/// ```
pub struct SharedRTreeMap<K, V> {
    current: RwLock<RTreeMap<K, V>>,
}

impl<K, V> SharedRTreeMap<K, V> {
    pub fn new(map: RTreeMap<K, V>) -> Self {
        SharedRTreeMap {
            current: RwLock::new(map),
        }
    }

    /// Returns the currently published version.
    pub fn snapshot(&self) -> RTreeMap<K, V> {
        self.current.read().clone()
    }

    /// Replaces the published version with `f(current)` and returns it.
    ///
    /// The write lock is held while `f` runs, so no update is lost. If `f`
    /// fails the published version stays as it was.
    pub fn update<F>(&self, f: F) -> RTreeResult<RTreeMap<K, V>>
    where
        F: FnOnce(&RTreeMap<K, V>) -> RTreeResult<RTreeMap<K, V>>,
    {
        let mut current = self.current.write();
        let next = f(&current)?;
        *current = next.clone();
        Ok(next)
    }

    /// Publishes `new` only if the current version is still `expected`.
    ///
    /// Returns whether `new` was published. Lets writers compute a new
    /// version without holding the lock and retry on conflict.
    pub fn compare_and_set(&self, expected: &RTreeMap<K, V>, new: RTreeMap<K, V>) -> bool {
        let mut current = self.current.write();
        if current.ptr_eq(expected) {
            *current = new;
            true
        } else {
            log::trace!("Stale version, not publishing");
            false
        }
    }
}
