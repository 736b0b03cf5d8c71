//! Cache Module
//!
//! Cache items with TTL expiration and the pool that persists them through a
//! pluggable repository, immediately or deferred.

mod item;
mod items;
mod key;
mod pool;
mod ttl;


use chrono::TimeDelta;

// Re-export public types
pub use item::Item;
pub use items::Items;
pub use key::validate_key;
pub use pool::Pool;
pub use ttl::{Lifetime, Ttl};

// == Public Constants ==
/// Characters a key must not contain
pub const RESERVED_KEY_CHARS: [char; 6] = ['(', ')', '{', '}', '/', '\\'];

/// Default TTL in seconds of a pool built with `Pool::new`
pub const DEFAULT_TTL_SECS: i64 = 3600;

/// Lifetime given to items that have no TTL at all.
///
/// Expiration is always a concrete instant, so "never expires" is modelled
/// as one year from the last `set`.
pub const UNBOUNDED_HORIZON: TimeDelta = TimeDelta::days(365);
