//! Item List Module
//!
//! Ordered result of a multi-key lookup.

use crate::cache::Item;

// == Items ==
/// Items keyed by cache key, in the order the keys were requested.
///
/// Duplicate keys keep their first position.
#[derive(Debug, Clone, PartialEq)]
pub struct Items<V> {
    entries: Vec<(String, Item<V>)>,
}

impl<V> Items<V> {
    pub(crate) fn from_entries(entries: Vec<(String, Item<V>)>) -> Self {
        Self { entries }
    }

    /// Returns the item for `key`, if it was requested.
    pub fn get(&self, key: &str) -> Option<&Item<V>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, item)| item)
    }

    /// Returns the keys in request order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates over `(key, item)` pairs in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Item<V>)> {
        self.entries.iter().map(|(k, item)| (k.as_str(), item))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for Items<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> IntoIterator for Items<V> {
    type Item = (String, Item<V>);
    type IntoIter = std::vec::IntoIter<(String, Item<V>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
