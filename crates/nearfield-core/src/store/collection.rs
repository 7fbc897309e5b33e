// ── Generic keyed entity collection ──
//
// Insertion-ordered storage for one entity kind. Iteration and listings
// always yield the oldest entity first.

use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;

use crate::error::CoreError;

/// Keyed container for a single entity kind.
pub(crate) struct EntityCollection<K, T> {
    by_key: IndexMap<K, T>,
}

impl<K, T> EntityCollection<K, T>
where
    K: Hash + Eq + Clone + fmt::Display,
{
    pub(crate) fn new() -> Self {
        Self {
            by_key: IndexMap::new(),
        }
    }

    /// Insert a new entity. Fails with `AlreadyExists` if the key is taken,
    /// leaving the stored entity untouched.
    pub(crate) fn insert(&mut self, key: K, entity: T) -> Result<(), CoreError> {
        if self.by_key.contains_key(&key) {
            return Err(CoreError::AlreadyExists {
                path: key.to_string(),
            });
        }
        self.by_key.insert(key, entity);
        Ok(())
    }

    /// Remove an entity, handing ownership back. Order of the remaining
    /// entries is preserved.
    pub(crate) fn remove(&mut self, key: &K) -> Option<T> {
        self.by_key.shift_remove(key)
    }

    pub(crate) fn get(&self, key: &K) -> Option<&T> {
        self.by_key.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &K) -> Option<&mut T> {
        self.by_key.get_mut(key)
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.by_key.contains_key(key)
    }

    /// All current keys, oldest first.
    pub(crate) fn keys(&self) -> impl ExactSizeIterator<Item = &K> {
        self.by_key.keys()
    }

    pub(crate) fn list(&self) -> Vec<K> {
        self.by_key.keys().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

impl<K, T> Default for EntityCollection<K, T>
where
    K: Hash + Eq + Clone + fmt::Display,
{
    fn default() -> Self {
        Self::new()
    }
}
