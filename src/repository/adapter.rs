//! Simple Repository Adapter
//!
//! Lifts a single-key backend to the bulk contract by looping.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::Item;
use crate::repository::{Repository, SimpleRepository};

// == Simple Repository Adapter ==
/// Wraps a [`SimpleRepository`] so it can back a pool.
///
/// Bulk writes visit every entry even after a failure and report the
/// aggregate, so one bad entry cannot block the rest of a batch.
#[derive(Debug, Default)]
pub struct SimpleRepositoryAdapter<S> {
    inner: S,
}

impl<S> SimpleRepositoryAdapter<S> {
    /// Wraps a single-key repository.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Returns the wrapped repository.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns the wrapped repository mutably.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Unwraps the adapter.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<V, S> Repository<V> for SimpleRepositoryAdapter<S>
where
    S: SimpleRepository<V>,
{
    fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }

    fn contains_many(&self, keys: &[String]) -> HashMap<String, bool> {
        keys.iter()
            .map(|key| (key.clone(), self.inner.contains(key)))
            .collect()
    }

    fn fetch(&self, key: &str) -> Option<Item<V>> {
        self.inner.fetch(key)
    }

    fn fetch_many(&self, keys: &[String]) -> HashMap<String, Option<Item<V>>> {
        keys.iter()
            .map(|key| (key.clone(), self.inner.fetch(key)))
            .collect()
    }

    fn store(&mut self, item: &Item<V>) -> bool {
        self.inner.store(item)
    }

    fn store_many(&mut self, items: &[Item<V>]) -> bool {
        let mut result = true;
        for item in items {
            if !self.inner.store(item) {
                debug!("Adapter: store failed for key {}", item.key());
                result = false;
            }
        }
        result
    }

    fn delete(&mut self, key: &str) -> bool {
        self.inner.delete(key)
    }

    fn delete_many(&mut self, keys: &[String]) -> bool {
        let mut result = true;
        for key in keys {
            if !self.inner.delete(key) {
                debug!("Adapter: delete failed for key {}", key);
                result = false;
            }
        }
        result
    }

    fn clear(&mut self) -> bool {
        self.inner.clear()
    }
}
