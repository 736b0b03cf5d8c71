//! Repository Module
//!
//! Storage contracts consumed by the pool, the adapter that lifts a
//! single-key backend to the bulk contract, and the bundled backends.
//!
//! # Backends
//! - `MemoryRepository` - HashMap held by the repository itself
//! - `FileRepository` - one JSON file per item in a directory
//! - `SessionRepository` - namespaced dictionary inside a shared `Session`

mod adapter;
mod file;
mod memory;
mod session;

use std::collections::HashMap;

use crate::cache::Item;

pub use adapter::SimpleRepositoryAdapter;
pub use file::{FileRepository, DEFAULT_EXTENSION};
pub use memory::MemoryRepository;
pub use session::{Session, SessionRepository, DEFAULT_NAMESPACE};

// == Simple Repository ==
/// Minimal single-key storage contract.
///
/// Failures are reported as `false` (or `None` for `fetch`), never as errors.
pub trait SimpleRepository<V> {
    /// Checks if an item is stored under `key`.
    fn contains(&self, key: &str) -> bool;

    /// Fetches the item stored under `key`, marked as cached.
    fn fetch(&self, key: &str) -> Option<Item<V>>;

    /// Stores an item under its own key, replacing any previous one.
    fn store(&mut self, item: &Item<V>) -> bool;

    /// Deletes the item stored under `key`.
    fn delete(&mut self, key: &str) -> bool;

    /// Removes every item.
    fn clear(&mut self) -> bool;
}

// == Repository ==
/// Bulk storage contract the pool operates against.
///
/// Backends that only implement [`SimpleRepository`] are wrapped in a
/// [`SimpleRepositoryAdapter`].
pub trait Repository<V> {
    /// Checks if an item is stored under `key`.
    fn contains(&self, key: &str) -> bool;

    /// Checks every key, one entry per key.
    fn contains_many(&self, keys: &[String]) -> HashMap<String, bool>;

    /// Fetches the item stored under `key`, marked as cached.
    fn fetch(&self, key: &str) -> Option<Item<V>>;

    /// Fetches every key, one entry per key.
    fn fetch_many(&self, keys: &[String]) -> HashMap<String, Option<Item<V>>>;

    /// Stores an item under its own key.
    fn store(&mut self, item: &Item<V>) -> bool;

    /// Stores every item; true only if all were stored.
    fn store_many(&mut self, items: &[Item<V>]) -> bool;

    /// Deletes the item stored under `key`.
    fn delete(&mut self, key: &str) -> bool;

    /// Deletes every key, continuing past failures; true only if all succeeded.
    fn delete_many(&mut self, keys: &[String]) -> bool;

    /// Removes every item.
    fn clear(&mut self) -> bool;
}

impl<V, R> Repository<V> for Box<R>
where
    R: Repository<V> + ?Sized,
{
    fn contains(&self, key: &str) -> bool {
        (**self).contains(key)
    }

    fn contains_many(&self, keys: &[String]) -> HashMap<String, bool> {
        (**self).contains_many(keys)
    }

    fn fetch(&self, key: &str) -> Option<Item<V>> {
        (**self).fetch(key)
    }

    fn fetch_many(&self, keys: &[String]) -> HashMap<String, Option<Item<V>>> {
        (**self).fetch_many(keys)
    }

    fn store(&mut self, item: &Item<V>) -> bool {
        (**self).store(item)
    }

    fn store_many(&mut self, items: &[Item<V>]) -> bool {
        (**self).store_many(items)
    }

    fn delete(&mut self, key: &str) -> bool {
        (**self).delete(key)
    }

    fn delete_many(&mut self, keys: &[String]) -> bool {
        (**self).delete_many(keys)
    }

    fn clear(&mut self) -> bool {
        (**self).clear()
    }
}
