//! Memory Repository
//!
//! Keeps items in a HashMap owned by the repository.

use std::collections::HashMap;

use crate::cache::Item;
use crate::repository::SimpleRepository;

// == Memory Repository ==
/// In-memory single-key backend.
///
/// Fetched items are clones, so mutating them does not touch the stored copy.
#[derive(Debug, Clone)]
pub struct MemoryRepository<V> {
    items: HashMap<String, Item<V>>,
}

impl<V> MemoryRepository<V> {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
        }
    }

    /// Returns the number of stored items, expired ones included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<V> Default for MemoryRepository<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> SimpleRepository<V> for MemoryRepository<V> {
    fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    fn fetch(&self, key: &str) -> Option<Item<V>> {
        self.items.get(key).cloned().map(|mut item| {
            item.mark_cached();
            item
        })
    }

    fn store(&mut self, item: &Item<V>) -> bool {
        self.items.insert(item.key().to_string(), item.clone());
        true
    }

    fn delete(&mut self, key: &str) -> bool {
        self.items.remove(key);
        true
    }

    fn clear(&mut self) -> bool {
        self.items.clear();
        true
    }
}
