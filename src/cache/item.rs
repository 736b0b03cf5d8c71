//! Cache Item Module
//!
//! Defines a single cache entry: key, value, expiration and whether the entry
//! is known to exist in a storage backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::key::validate_key;
use crate::cache::ttl::{Lifetime, Ttl};
use crate::cache::UNBOUNDED_HORIZON;
use crate::error::Result;

// == Cache Item ==
/// A single cached entry.
///
/// Items are produced by a [`Pool`](crate::cache::Pool), either fresh or
/// reconstituted by a backend, mutated by the caller and handed back to the
/// pool to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item<V> {
    /// Validated key
    key: String,
    /// The stored value, None until `set` is called
    value: Option<V>,
    /// Absolute expiration instant
    expiration: DateTime<Utc>,
    /// TTL in seconds applied by `set` when no explicit TTL is given
    default_ttl: Option<i64>,
    /// True once the item has been persisted or fetched from a backend
    #[serde(skip)]
    cached: bool,
}

impl<V> Item<V> {
    // == Constructor ==
    /// Creates a fresh item that does not exist in any backend yet.
    ///
    /// # Arguments
    /// * `key` - The item key, see [`validate_key`]
    /// * `default_ttl` - TTL in seconds used by `set`, None = unbounded
    ///
    /// # Errors
    /// `InvalidKey` for a bad key, `InvalidArgument` when `default_ttl` does
    /// not yield a representable expiration.
    pub fn new(key: impl Into<String>, default_ttl: Option<i64>) -> Result<Self> {
        let key = key.into();
        validate_key(&key)?;

        let expiration = default_expiration(default_ttl, Utc::now())?;

        Ok(Self {
            key,
            value: None,
            expiration,
            default_ttl,
            cached: false,
        })
    }

    // == Set ==
    /// Stores a value and resets the expiration from the default TTL.
    pub fn set(&mut self, value: V) -> &mut Self {
        let now = Utc::now();
        self.value = Some(value);
        // The default TTL was range-checked at construction.
        self.expiration = default_expiration(self.default_ttl, now)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self
    }

    /// Stores a value with an explicit TTL.
    ///
    /// The TTL may be a number of seconds, a duration or an absolute instant.
    pub fn set_with_ttl(&mut self, value: V, ttl: impl Into<Ttl>) -> Result<&mut Self> {
        self.expiration = ttl.into().expiration_from(Utc::now())?;
        self.value = Some(value);
        Ok(self)
    }

    // == Expiration ==
    /// Sets the expiration to an absolute instant.
    ///
    /// Accepts UTC, local and fixed-offset instants as well as `SystemTime`.
    pub fn expires_at(&mut self, at: impl Into<DateTime<Utc>>) -> &mut Self {
        self.expiration = at.into();
        self
    }

    /// Sets the expiration relative to now.
    ///
    /// A negative lifetime is accepted and leaves the item already expired.
    pub fn expires_after(&mut self, lifetime: impl Into<Lifetime>) -> Result<&mut Self> {
        self.expiration = lifetime.into().expiration_from(Utc::now())?;
        Ok(self)
    }

    /// Returns the expiration instant.
    ///
    /// Items without a TTL report `now + UNBOUNDED_HORIZON` as of the last
    /// `set`, never a "no expiration" marker.
    pub fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }

    // == Queries ==
    /// Returns the item key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the TTL used by `set` when none is given.
    pub fn default_ttl(&self) -> Option<i64> {
        self.default_ttl
    }

    /// Returns the value on a hit, None on a miss.
    pub fn get(&self) -> Option<&V> {
        if self.is_hit() {
            self.value.as_ref()
        } else {
            None
        }
    }

    /// Consumes the item and returns the raw value regardless of hit state.
    pub fn into_value(self) -> Option<V> {
        self.value
    }

    /// True when the item exists in a backend.
    pub fn exists(&self) -> bool {
        self.cached
    }

    /// Boundary condition: expired once now >= expiration.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Checks expiry against a given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration
    }

    /// True when the item exists and has not expired.
    pub fn is_hit(&self) -> bool {
        self.exists() && !self.is_expired()
    }

    // == Mark Cached ==
    /// Records that the item now exists in a backend.
    ///
    /// Called by the pool when persisting and by backends when
    /// reconstituting a stored item. Application code should not call it.
    pub fn mark_cached(&mut self) -> &mut Self {
        self.cached = true;
        self
    }
}

// == Utility Functions ==
/// Resolves the expiration for an item without an explicit TTL.
fn default_expiration(default_ttl: Option<i64>, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    match default_ttl {
        Some(secs) => Lifetime::Seconds(secs).expiration_from(now),
        None => Lifetime::Delta(UNBOUNDED_HORIZON).expiration_from(now),
    }
}
