//! Session Repository
//!
//! A process-scoped store backed by a shared session dictionary. Every
//! repository works inside its own namespace of the session.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::cache::Item;
use crate::error::{CacheError, Result};
use crate::repository::Repository;

// == Public Constants ==
/// Namespace used by `SessionRepository::new`
pub const DEFAULT_NAMESPACE: &str = "cache.pool";

// == Session ==
#[derive(Debug)]
struct SessionState<V> {
    active: bool,
    namespaces: HashMap<String, HashMap<String, Item<V>>>,
}

/// Shared session dictionary.
///
/// Clones share the same state. A session starts inactive; repositories can
/// only be created while it is active.
#[derive(Debug)]
pub struct Session<V> {
    state: Arc<Mutex<SessionState<V>>>,
}

impl<V> Clone for Session<V> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<V> Default for Session<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Session<V> {
    /// Creates an inactive session.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState {
                active: false,
                namespaces: HashMap::new(),
            })),
        }
    }

    /// Creates an already started session.
    pub fn started() -> Self {
        let session = Self::new();
        session.start();
        session
    }

    /// Activates the session. Data kept from a previous run is visible again.
    pub fn start(&self) {
        self.lock().active = true;
    }

    /// Deactivates the session without discarding its data.
    pub fn end(&self) {
        self.lock().active = false;
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    fn lock(&self) -> MutexGuard<'_, SessionState<V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// == Session Repository ==
/// Bulk backend storing items in a session namespace.
#[derive(Debug)]
pub struct SessionRepository<V> {
    session: Session<V>,
    namespace: String,
}

impl<V> SessionRepository<V> {
    /// Creates a repository in the default namespace.
    pub fn new(session: &Session<V>) -> Result<Self> {
        Self::with_namespace(session, DEFAULT_NAMESPACE)
    }

    /// Creates a repository in the given namespace.
    ///
    /// # Errors
    /// `BackendUnavailable` if the session is not active.
    pub fn with_namespace(session: &Session<V>, namespace: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();

        if !session.is_active() {
            return Err(CacheError::BackendUnavailable(format!(
                "session must be active to open namespace '{}'",
                namespace
            )));
        }

        Ok(Self {
            session: session.clone(),
            namespace,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Runs `f` against this namespace, or returns None once the session ended.
    fn with_data<T>(&self, f: impl FnOnce(&mut HashMap<String, Item<V>>) -> T) -> Option<T> {
        let mut state = self.session.lock();
        if !state.active {
            warn!("Session cache: session ended, namespace '{}' unavailable", self.namespace);
            return None;
        }
        let data = state.namespaces.entry(self.namespace.clone()).or_default();
        Some(f(data))
    }
}

impl<V: Clone> Repository<V> for SessionRepository<V> {
    fn contains(&self, key: &str) -> bool {
        self.with_data(|data| data.contains_key(key)).unwrap_or(false)
    }

    fn contains_many(&self, keys: &[String]) -> HashMap<String, bool> {
        keys.iter()
            .map(|key| (key.clone(), self.contains(key)))
            .collect()
    }

    fn fetch(&self, key: &str) -> Option<Item<V>> {
        self.with_data(|data| data.get(key).cloned())
            .flatten()
            .map(|mut item| {
                item.mark_cached();
                item
            })
    }

    fn fetch_many(&self, keys: &[String]) -> HashMap<String, Option<Item<V>>> {
        keys.iter()
            .map(|key| (key.clone(), self.fetch(key)))
            .collect()
    }

    fn store(&mut self, item: &Item<V>) -> bool {
        self.with_data(|data| {
            data.insert(item.key().to_string(), item.clone());
        })
        .is_some()
    }

    fn store_many(&mut self, items: &[Item<V>]) -> bool {
        items
            .iter()
            .fold(true, |result, item| self.store(item) && result)
    }

    fn delete(&mut self, key: &str) -> bool {
        self.with_data(|data| {
            data.remove(key);
        })
        .is_some()
    }

    fn delete_many(&mut self, keys: &[String]) -> bool {
        keys.iter()
            .fold(true, |result, key| self.delete(key) && result)
    }

    fn clear(&mut self) -> bool {
        self.with_data(|data| data.clear()).is_some()
    }
}
