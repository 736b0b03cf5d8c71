//! Cache Pool Module
//!
//! The façade callers use: produces items, resolves batched lookups against
//! the backend, persists items immediately or defers them, and flushes the
//! deferred buffer on commit or when the pool is dropped.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::cache::key::validate_key;
use crate::cache::ttl::Lifetime;
use crate::cache::{Item, Items, DEFAULT_TTL_SECS};
use crate::error::Result;
use crate::repository::Repository;

// == Cache Pool ==
/// Coordinates item creation, retrieval and persistence against a backend.
///
/// The pool is single-threaded: share it behind a lock if several tasks
/// need it. Deferred items are flushed exactly once, by `commit`, `close`
/// or on drop.
pub struct Pool<V, R>
where
    R: Repository<V>,
{
    /// Storage backend
    repository: R,
    /// TTL in seconds for items created by the pool, None = unbounded
    default_ttl: Option<i64>,
    /// Items waiting for the next commit
    deferred: HashMap<String, Item<V>>,
}

impl<V, R> Pool<V, R>
where
    R: Repository<V>,
{
    // == Constructor ==
    /// Creates a pool with the default TTL of `DEFAULT_TTL_SECS`.
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            default_ttl: Some(DEFAULT_TTL_SECS),
            deferred: HashMap::new(),
        }
    }

    /// Creates a pool with a custom default TTL in seconds, None = unbounded.
    ///
    /// # Errors
    /// `InvalidArgument` if the TTL cannot be turned into an expiration.
    pub fn with_default_ttl(repository: R, default_ttl: Option<i64>) -> Result<Self> {
        if let Some(secs) = default_ttl {
            Lifetime::Seconds(secs).expiration_from(Utc::now())?;
        }

        Ok(Self {
            repository,
            default_ttl,
            deferred: HashMap::new(),
        })
    }

    pub fn default_ttl(&self) -> Option<i64> {
        self.default_ttl
    }

    /// Returns the storage backend.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns the number of items waiting for commit.
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    /// Checks if an item is waiting for commit under `key`.
    pub fn is_deferred(&self, key: &str) -> bool {
        self.deferred.contains_key(key)
    }

    // == Get Item ==
    /// Returns the item for `key`.
    ///
    /// Lookup order: the deferred buffer, then the backend, else a fresh
    /// item with the pool's default TTL. A deferred item is returned as a
    /// copy; hand it back with `save` or `save_deferred` after changing it.
    ///
    /// # Errors
    /// `InvalidKey` if the key is invalid.
    pub fn get_item(&self, key: &str) -> Result<Item<V>>
    where
        V: Clone,
    {
        validate_key(key)?;

        if let Some(item) = self.deferred.get(key) {
            debug!("Pool: {} served from deferred buffer", key);
            return Ok(item.clone());
        }

        if self.repository.contains(key) {
            if let Some(item) = self.repository.fetch(key) {
                return Ok(item);
            }
            debug!("Pool: {} reported present but could not be fetched", key);
        }

        self.create_item(key)
    }

    // == Get Items ==
    /// Returns one item per requested key, in request order.
    ///
    /// Behaves like `get_item` for every key, but asks the backend with a
    /// single `contains_many` and at most one `fetch_many`. Deferred items
    /// win over backend entries. No keys means no backend calls.
    ///
    /// # Errors
    /// `InvalidKey` if any key is invalid; nothing is looked up in that case.
    pub fn get_items<K>(&self, keys: &[K]) -> Result<Items<V>>
    where
        K: AsRef<str>,
        V: Clone,
    {
        let mut seen = HashSet::with_capacity(keys.len());
        let mut requested = Vec::with_capacity(keys.len());
        for key in keys {
            let key = key.as_ref();
            validate_key(key)?;
            if seen.insert(key) {
                requested.push(key.to_string());
            }
        }

        let lookup: Vec<String> = requested
            .iter()
            .filter(|key| !self.deferred.contains_key(key.as_str()))
            .cloned()
            .collect();

        let mut fetched = HashMap::new();
        if !lookup.is_empty() {
            let contains = self.repository.contains_many(&lookup);
            let present: Vec<String> = lookup
                .into_iter()
                .filter(|key| contains.get(key).copied().unwrap_or(false))
                .collect();

            if !present.is_empty() {
                fetched = self.repository.fetch_many(&present);
            }
        }

        let mut entries = Vec::with_capacity(requested.len());
        for key in requested {
            let item = match self.deferred.get(&key) {
                Some(item) => item.clone(),
                None => match fetched.remove(&key).flatten() {
                    Some(item) => item,
                    None => self.create_item(&key)?,
                },
            };
            entries.push((key, item));
        }

        debug!("Pool: resolved {} items", entries.len());
        Ok(Items::from_entries(entries))
    }

    // == Clear ==
    /// Empties the backend and discards every deferred item.
    ///
    /// Returns whether the backend reported success.
    pub fn clear(&mut self) -> bool {
        if !self.deferred.is_empty() {
            debug!("Pool: discarding {} deferred items on clear", self.deferred.len());
            self.deferred.clear();
        }

        let cleared = self.repository.clear();
        if !cleared {
            warn!("Pool: backend failed to clear");
        }
        cleared
    }

    // == Delete Items ==
    /// Deletes items from the backend and drops matching deferred items.
    pub fn delete_items<K>(&mut self, keys: &[K]) -> &mut Self
    where
        K: AsRef<str>,
    {
        let keys: Vec<String> = keys.iter().map(|k| k.as_ref().to_string()).collect();

        for key in &keys {
            if self.deferred.remove(key).is_some() {
                debug!("Pool: dropped deferred item {}", key);
            }
        }

        if !self.repository.delete_many(&keys) {
            warn!("Pool: backend failed to delete some of {} keys", keys.len());
        }
        self
    }

    // == Save ==
    /// Persists an item immediately and marks it cached.
    ///
    /// A deferred item with the same key is dropped, since this write is
    /// newer. A failed store is logged, caching stays best effort.
    pub fn save(&mut self, item: &mut Item<V>) -> &mut Self {
        self.deferred.remove(item.key());
        item.mark_cached();

        if self.repository.store(item) {
            debug!("Pool: stored {}", item.key());
        } else {
            warn!("Pool: backend failed to store {}", item.key());
        }
        self
    }

    /// Queues an item for the next commit, replacing any queued item with
    /// the same key. The item is marked cached when it is committed.
    pub fn save_deferred(&mut self, item: Item<V>) -> &mut Self {
        debug!("Pool: deferred {}", item.key());
        self.deferred.insert(item.key().to_string(), item);
        self
    }

    // == Commit ==
    /// Persists every deferred item with one bulk store.
    ///
    /// The buffer is emptied whatever the outcome; failed items are not
    /// retried. Returns true if every item was stored, and true without
    /// touching the backend when nothing is deferred.
    pub fn commit(&mut self) -> bool {
        if self.deferred.is_empty() {
            return true;
        }

        let mut items: Vec<Item<V>> = std::mem::take(&mut self.deferred).into_values().collect();
        for item in &mut items {
            item.mark_cached();
        }

        let stored = self.repository.store_many(&items);
        if stored {
            info!("Pool: committed {} deferred items", items.len());
        } else {
            warn!("Pool: commit of {} deferred items was incomplete", items.len());
        }
        stored
    }

    /// Commits pending items and releases the pool.
    pub fn close(mut self) -> bool {
        self.commit()
    }

    fn create_item(&self, key: &str) -> Result<Item<V>> {
        Item::new(key, self.default_ttl)
    }
}

impl<V, R> Drop for Pool<V, R>
where
    R: Repository<V>,
{
    fn drop(&mut self) {
        if !self.deferred.is_empty() {
            debug!("Pool: flushing {} deferred items on drop", self.deferred.len());
            self.commit();
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::repository::{MemoryRepository, Session, SessionRepository, SimpleRepositoryAdapter};
    use chrono::TimeDelta;
    use std::cell::RefCell;
    use std::rc::Rc;

    type CallLog = Rc<RefCell<Vec<&'static str>>>;

    /// Memory backend that records which contract operations were called.
    /// The log is shared so it can be read after the pool is gone.
    #[derive(Default)]
    struct RecordingRepository {
        inner: SimpleRepositoryAdapter<MemoryRepository<String>>,
        calls: CallLog,
        fail_stores: bool,
    }

    impl RecordingRepository {
        fn failing() -> Self {
            Self {
                fail_stores: true,
                ..Self::default()
            }
        }

        fn record(&self, call: &'static str) {
            self.calls.borrow_mut().push(call);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.borrow().clone()
        }

        fn reset(&self) {
            self.calls.borrow_mut().clear();
        }

        fn call_log(&self) -> CallLog {
            Rc::clone(&self.calls)
        }
    }

    impl Repository<String> for RecordingRepository {
        fn contains(&self, key: &str) -> bool {
            self.record("contains");
            self.inner.contains(key)
        }

        fn contains_many(&self, keys: &[String]) -> HashMap<String, bool> {
            self.record("contains_many");
            self.inner.contains_many(keys)
        }

        fn fetch(&self, key: &str) -> Option<Item<String>> {
            self.record("fetch");
            self.inner.fetch(key)
        }

        fn fetch_many(&self, keys: &[String]) -> HashMap<String, Option<Item<String>>> {
            self.record("fetch_many");
            self.inner.fetch_many(keys)
        }

        fn store(&mut self, item: &Item<String>) -> bool {
            self.record("store");
            !self.fail_stores && self.inner.store(item)
        }

        fn store_many(&mut self, items: &[Item<String>]) -> bool {
            self.record("store_many");
            !self.fail_stores && self.inner.store_many(items)
        }

        fn delete(&mut self, key: &str) -> bool {
            self.record("delete");
            self.inner.delete(key)
        }

        fn delete_many(&mut self, keys: &[String]) -> bool {
            self.record("delete_many");
            self.inner.delete_many(keys)
        }

        fn clear(&mut self) -> bool {
            self.record("clear");
            self.inner.clear()
        }
    }

    fn pool() -> Pool<String, RecordingRepository> {
        Pool::new(RecordingRepository::default())
    }

    fn save_value(pool: &mut Pool<String, RecordingRepository>, key: &str, value: &str) {
        let mut item = pool.get_item(key).unwrap();
        item.set(value.to_string());
        pool.save(&mut item);
    }

    fn defer_value(pool: &mut Pool<String, RecordingRepository>, key: &str, value: &str) {
        let mut item = pool.get_item(key).unwrap();
        item.set(value.to_string());
        pool.save_deferred(item);
    }

    fn value_of(pool: &Pool<String, RecordingRepository>, key: &str) -> Option<String> {
        pool.get_item(key).unwrap().get().cloned()
    }

    #[test]
    fn test_pool_defaults() {
        let pool = pool();
        assert_eq!(pool.default_ttl(), Some(DEFAULT_TTL_SECS));
        assert_eq!(pool.deferred_len(), 0);
    }

    #[test]
    fn test_invalid_default_ttl() {
        let result = Pool::<String, _>::with_default_ttl(RecordingRepository::default(), Some(i64::MAX));
        assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
    }

    #[test]
    fn test_unbounded_default_ttl() {
        let pool = Pool::with_default_ttl(RecordingRepository::default(), None).unwrap();
        let item = pool.get_item("key").unwrap();
        assert_eq!(item.default_ttl(), None);
        assert!(item.expiration() > Utc::now() + TimeDelta::days(364));
    }

    #[test]
    fn test_get_item_miss() {
        let pool = pool();
        let item = pool.get_item("missing").unwrap();

        assert_eq!(item.key(), "missing");
        assert!(!item.exists());
        assert!(!item.is_hit());
        assert_eq!(item.default_ttl(), Some(DEFAULT_TTL_SECS));
    }

    #[test]
    fn test_get_item_invalid_key() {
        let pool = pool();
        assert!(matches!(pool.get_item("t{est"), Err(CacheError::InvalidKey(_))));
        assert!(matches!(pool.get_item("test/"), Err(CacheError::InvalidKey(_))));
        assert!(pool.repository().calls().is_empty());
    }

    #[test]
    fn test_save_then_get_is_hit() {
        let mut pool = pool();
        let mut item = pool.get_item("key").unwrap();
        item.set("value".to_string());
        pool.save(&mut item);

        assert!(item.exists());
        let fetched = pool.get_item("key").unwrap();
        assert!(fetched.is_hit());
        assert_eq!(fetched.get().map(String::as_str), Some("value"));
    }

    #[test]
    fn test_save_expired_item_is_miss() {
        let mut pool = pool();
        let mut item = pool.get_item("key").unwrap();
        item.set("value".to_string());
        item.expires_after(-10).unwrap();
        pool.save(&mut item);

        let fetched = pool.get_item("key").unwrap();
        assert!(fetched.exists());
        assert!(fetched.is_expired());
        assert!(!fetched.is_hit());
        assert_eq!(fetched.get(), None);
    }

    #[test]
    fn test_save_deferred_read_your_writes() {
        let mut pool = pool();
        defer_value(&mut pool, "key", "pending");
        pool.repository().reset();

        let item = pool.get_item("key").unwrap();
        assert!(!item.exists());
        assert!(pool.is_deferred("key"));
        assert!(pool.repository().calls().is_empty());
    }

    #[test]
    fn test_commit_empty_buffer() {
        let mut pool = pool();
        assert!(pool.commit());
        assert!(pool.repository().calls().is_empty());
    }

    #[test]
    fn test_commit_persists_deferred_items() {
        let mut pool = pool();
        defer_value(&mut pool, "a", "1");
        defer_value(&mut pool, "b", "2");
        pool.repository().reset();

        assert!(pool.commit());
        assert_eq!(pool.repository().calls(), vec!["store_many"]);
        assert_eq!(pool.deferred_len(), 0);

        let a = pool.get_item("a").unwrap();
        let b = pool.get_item("b").unwrap();
        assert!(a.exists() && b.exists());
        assert_eq!(value_of(&pool, "a").as_deref(), Some("1"));
        assert_eq!(value_of(&pool, "b").as_deref(), Some("2"));
    }

    #[test]
    fn test_commit_failure_still_empties_buffer() {
        let mut pool = Pool::new(RecordingRepository::failing());
        let mut item = pool.get_item("key").unwrap();
        item.set("value".to_string());
        pool.save_deferred(item);

        assert!(!pool.commit());
        assert_eq!(pool.deferred_len(), 0);
        assert!(pool.commit());
    }

    #[test]
    fn test_save_deferred_replaces_same_key() {
        let mut pool = pool();
        defer_value(&mut pool, "key", "first");
        defer_value(&mut pool, "key", "second");
        assert_eq!(pool.deferred_len(), 1);

        pool.commit();
        assert_eq!(value_of(&pool, "key").as_deref(), Some("second"));
    }

    #[test]
    fn test_save_supersedes_deferred_item() {
        let mut pool = pool();
        defer_value(&mut pool, "key", "old");
        save_value(&mut pool, "key", "new");

        assert!(!pool.is_deferred("key"));
        pool.commit();
        assert_eq!(value_of(&pool, "key").as_deref(), Some("new"));
    }

    #[test]
    fn test_get_items_order_and_state() {
        let mut pool = pool();
        save_value(&mut pool, "k2", "two");
        pool.repository().reset();

        let items = pool.get_items(&["k1", "k2", "k3"]).unwrap();

        assert_eq!(items.keys().collect::<Vec<_>>(), vec!["k1", "k2", "k3"]);
        assert!(items.get("k2").unwrap().is_hit());
        assert!(!items.get("k1").unwrap().exists());
        assert!(!items.get("k3").unwrap().exists());
        assert_eq!(pool.repository().calls(), vec!["contains_many", "fetch_many"]);
    }

    #[test]
    fn test_get_items_skips_fetch_when_nothing_stored() {
        let pool = pool();
        let items = pool.get_items(&["a", "b"]).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(pool.repository().calls(), vec!["contains_many"]);
    }

    #[test]
    fn test_get_items_prefers_deferred() {
        let mut pool = pool();
        save_value(&mut pool, "key", "stored");
        defer_value(&mut pool, "key", "pending");
        pool.repository().reset();

        let items = pool.get_items(&["key"]).unwrap();
        let item = items.get("key").unwrap();
        assert!(!item.exists());
        assert!(pool.repository().calls().is_empty());
    }

    #[test]
    fn test_get_items_empty() {
        let pool = pool();
        let keys: [&str; 0] = [];
        let items = pool.get_items(&keys).unwrap();
        assert!(items.is_empty());
        assert!(pool.repository().calls().is_empty());
    }

    #[test]
    fn test_get_items_duplicate_keys() {
        let pool = pool();
        let items = pool.get_items(&["a", "b", "a"]).unwrap();
        assert_eq!(items.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_get_items_invalid_key() {
        let pool = pool();
        let result = pool.get_items(&["ok", "t(est"]);
        assert!(matches!(result, Err(CacheError::InvalidKey(_))));
        assert!(pool.repository().calls().is_empty());
    }

    #[test]
    fn test_clear_discards_deferred() {
        let mut pool = pool();
        save_value(&mut pool, "stored", "a");
        defer_value(&mut pool, "pending", "b");

        assert!(pool.clear());
        assert_eq!(pool.deferred_len(), 0);
        assert!(!pool.repository().inner.contains("stored"));

        pool.commit();
        assert!(!pool.get_item("pending").unwrap().exists());
    }

    #[test]
    fn test_delete_items() {
        let mut pool = pool();
        save_value(&mut pool, "a", "1");
        save_value(&mut pool, "b", "2");
        defer_value(&mut pool, "c", "3");

        pool.delete_items(&["a", "c"]);

        assert!(!pool.get_item("a").unwrap().exists());
        assert!(pool.get_item("b").unwrap().is_hit());
        assert!(!pool.is_deferred("c"));
        pool.commit();
        assert!(!pool.get_item("c").unwrap().exists());
    }

    #[test]
    fn test_close_flushes_exactly_once() {
        let mut pool = pool();
        defer_value(&mut pool, "a", "1");
        defer_value(&mut pool, "b", "2");
        let calls = pool.repository().call_log();
        pool.repository().reset();

        // close commits, then the drop that follows must not touch the backend
        assert!(pool.close());
        assert_eq!(*calls.borrow(), vec!["store_many"]);
    }

    #[test]
    fn test_drop_flushes_exactly_once() {
        let repository = RecordingRepository::default();
        let calls = repository.call_log();
        {
            let mut pool = Pool::new(repository);
            defer_value(&mut pool, "key", "value");
            pool.repository().reset();
        }

        assert_eq!(*calls.borrow(), vec!["store_many"]);
    }

    #[test]
    fn test_drop_after_commit_makes_no_calls() {
        let repository = RecordingRepository::default();
        let calls = repository.call_log();
        {
            let mut pool = Pool::new(repository);
            defer_value(&mut pool, "key", "value");
            assert!(pool.commit());
            pool.repository().reset();
        }

        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_drop_with_empty_buffer_makes_no_calls() {
        let repository = RecordingRepository::default();
        let calls = repository.call_log();
        drop(Pool::<String, _>::new(repository));

        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_close_persists_deferred_items() {
        let session = Session::started();
        let mut pool = Pool::new(SessionRepository::new(&session).unwrap());
        let mut item = pool.get_item("key").unwrap();
        item.set(5u32);
        pool.save_deferred(item);

        assert!(pool.close());

        let reader = SessionRepository::new(&session).unwrap();
        assert!(reader.fetch("key").unwrap().is_hit());
    }

    #[test]
    fn test_drop_flushes_deferred_items() {
        let session = Session::started();
        {
            let mut pool = Pool::new(SessionRepository::new(&session).unwrap());
            let mut item = pool.get_item("key").unwrap();
            item.set(5u32);
            pool.save_deferred(item);
        }

        let reader = SessionRepository::new(&session).unwrap();
        let item = reader.fetch("key").unwrap();
        assert!(item.is_hit());
        assert_eq!(item.get(), Some(&5));
    }
}
