use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;

use fxhash::FxHashMap;
use parking_lot::RwLock;

use crate::model::{shared, Shared};

/// Orders two entities when listing a sorted cache.
pub type Comparator<T> = fn(&T, &T) -> Ordering;

struct Inner<K, T> {
    map: FxHashMap<K, Shared<T>>,
    /// Ids in insertion order. An update keeps the original slot.
    order: Vec<K>,
}

/// A map from snowflake ids to shared entities.
///
/// At most one entry exists per id. Inserting an entity under an id that is already present
/// overwrites the fields of the existing entity under its write lock, so the [`Shared`] handle
/// previously returned for that id stays valid and observes the new data.
///
/// [`Self::values`] lists entities in insertion order, or sorted by the comparator given to
/// [`Self::sorted`].
///
/// The cache itself is guarded by a read-write lock: lookups may run concurrently, while
/// insertions and removals are exclusive.
pub struct SnowflakeCache<K, T> {
    inner: RwLock<Inner<K, T>>,
    comparator: Option<Comparator<T>>,
}

impl<K, T> SnowflakeCache<K, T>
where
    K: Copy + Eq + Hash,
{
    /// Creates an empty cache listing its values in insertion order.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                map: FxHashMap::default(),
                order: Vec::new(),
            }),
            comparator: None,
        }
    }

    /// Creates an empty cache listing its values sorted by `comparator`.
    #[must_use]
    pub fn sorted(comparator: Comparator<T>) -> Self {
        Self {
            comparator: Some(comparator),
            ..Self::new()
        }
    }

    /// Inserts an entity, or updates the existing entity with the same id in place.
    ///
    /// Returns the handle stored in the cache.
    ///
    /// The cache lock is released before the existing entity is written, so readers holding an
    /// entity guard may look the cache up while an update of that entity is pending.
    pub fn insert_or_update(&self, id: K, entity: T) -> Shared<T> {
        let existing = {
            let mut inner = self.inner.write();

            match inner.map.get(&id).map(Shared::clone) {
                Some(existing) => existing,
                None => {
                    let handle = shared(entity);
                    inner.map.insert(id, Shared::clone(&handle));
                    inner.order.push(id);
                    return handle;
                },
            }
        };

        *existing.write() = entity;
        existing
    }

    /// Returns the entity stored under `id`, creating it with `create` if absent.
    ///
    /// The boolean is `true` when the entity was created by this call.
    pub fn get_or_insert_with(&self, id: K, create: impl FnOnce() -> T) -> (Shared<T>, bool) {
        if let Some(existing) = self.get(&id) {
            return (existing, false);
        }

        let mut inner = self.inner.write();
        // Another writer may have raced us between the two locks.
        if let Some(existing) = inner.map.get(&id) {
            return (Shared::clone(existing), false);
        }

        let handle = shared(create());
        inner.map.insert(id, Shared::clone(&handle));
        inner.order.push(id);
        (handle, true)
    }

    #[must_use]
    pub fn get(&self, id: &K) -> Option<Shared<T>> {
        self.inner.read().map.get(id).map(Shared::clone)
    }

    /// Removes the entity stored under `id`, returning it.
    pub fn remove(&self, id: &K) -> Option<Shared<T>> {
        let mut inner = self.inner.write();
        let removed = inner.map.remove(id)?;
        inner.order.retain(|k| k != id);
        Some(removed)
    }

    #[must_use]
    pub fn contains(&self, id: &K) -> bool {
        self.inner.read().map.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().map.is_empty()
    }

    /// The ids of all entries, in insertion order.
    #[must_use]
    pub fn ids(&self) -> Vec<K> {
        self.inner.read().order.clone()
    }

    /// All entities, sorted by the configured comparator or else in insertion order.
    #[must_use]
    pub fn values(&self) -> Vec<Shared<T>> {
        let mut values: Vec<Shared<T>> = {
            let inner = self.inner.read();
            inner.order.iter().filter_map(|id| inner.map.get(id).map(Shared::clone)).collect()
        };

        if let Some(comparator) = self.comparator {
            // Callers may already hold a read guard on one of the entities.
            values.sort_by(|a, b| comparator(&a.read_recursive(), &b.read_recursive()));
        }

        values
    }
}

impl<K, T> Default for SnowflakeCache<K, T>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Clones every entity into a new handle; the clone shares nothing with the original.
impl<K, T> Clone for SnowflakeCache<K, T>
where
    K: Copy + Eq + Hash,
    T: Clone,
{
    fn clone(&self) -> Self {
        let inner = self.inner.read();
        let map =
            inner.map.iter().map(|(id, entity)| (*id, shared(entity.read().clone()))).collect();

        Self {
            inner: RwLock::new(Inner {
                map,
                order: inner.order.clone(),
            }),
            comparator: self.comparator,
        }
    }
}

impl<K, T> fmt::Debug for SnowflakeCache<K, T>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeCache")
            .field("ids", &self.inner.read().order)
            .field("sorted", &self.comparator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Entry {
        rank: i64,
        label: &'static str,
    }

    #[test]
    fn update_keeps_identity_and_slot() {
        let cache = SnowflakeCache::new();
        let first = cache.insert_or_update(1_u64, Entry {
            rank: 0,
            label: "a",
        });
        cache.insert_or_update(2, Entry {
            rank: 0,
            label: "b",
        });
        let again = cache.insert_or_update(1, Entry {
            rank: 0,
            label: "c",
        });

        assert!(Shared::ptr_eq(&first, &again));
        assert_eq!(first.read().label, "c");
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.ids(), vec![1, 2]);
    }

    #[test]
    fn sorted_values() {
        let cache = SnowflakeCache::sorted(|a: &Entry, b: &Entry| b.rank.cmp(&a.rank));
        for (id, rank) in [(1_u64, 3), (2, 9), (3, 5)] {
            cache.insert_or_update(id, Entry {
                rank,
                label: "",
            });
        }

        let ranks: Vec<i64> = cache.values().iter().map(|e| e.read().rank).collect();
        assert_eq!(ranks, vec![9, 5, 3]);
    }

    #[test]
    fn remove_and_get_or_insert() {
        let cache = SnowflakeCache::new();
        let (created, fresh) = cache.get_or_insert_with(7_u64, || Entry {
            rank: 1,
            label: "x",
        });
        assert!(fresh);

        let (found, fresh) = cache.get_or_insert_with(7, || Entry {
            rank: 2,
            label: "y",
        });
        assert!(!fresh);
        assert!(Shared::ptr_eq(&created, &found));

        assert!(cache.remove(&7).is_some());
        assert!(cache.remove(&7).is_none());
        assert!(cache.is_empty());
        assert!(cache.ids().is_empty());
    }
}
