//! TTL Module
//!
//! Relative lifetimes and absolute expirations accepted by cache items.

use std::time::{Duration as StdDuration, SystemTime};

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{CacheError, Result};

// == Lifetime ==
/// A duration relative to "now" after which an item expires.
///
/// Negative lifetimes are legal and produce an already-expired item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Whole seconds
    Seconds(i64),
    /// A chrono duration
    Delta(TimeDelta),
    /// A standard library duration
    Std(StdDuration),
}

impl Lifetime {
    /// Converts the lifetime into a chrono duration.
    pub fn to_delta(self) -> Result<TimeDelta> {
        match self {
            Lifetime::Seconds(secs) => TimeDelta::try_seconds(secs).ok_or_else(|| {
                CacheError::InvalidArgument(format!("ttl of {} seconds is out of range", secs))
            }),
            Lifetime::Delta(delta) => Ok(delta),
            Lifetime::Std(duration) => TimeDelta::from_std(duration).map_err(|_| {
                CacheError::InvalidArgument(format!("ttl of {:?} is out of range", duration))
            }),
        }
    }

    /// Returns the instant this lifetime ends when started at `now`.
    pub fn expiration_from(self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let delta = self.to_delta()?;
        now.checked_add_signed(delta).ok_or_else(|| {
            CacheError::InvalidArgument(format!("expiration {} after {} is out of range", delta, now))
        })
    }
}

impl From<i32> for Lifetime {
    fn from(secs: i32) -> Self {
        Lifetime::Seconds(i64::from(secs))
    }
}

impl From<i64> for Lifetime {
    fn from(secs: i64) -> Self {
        Lifetime::Seconds(secs)
    }
}

impl From<TimeDelta> for Lifetime {
    fn from(delta: TimeDelta) -> Self {
        Lifetime::Delta(delta)
    }
}

impl From<StdDuration> for Lifetime {
    fn from(duration: StdDuration) -> Self {
        Lifetime::Std(duration)
    }
}

// == Ttl ==
/// The TTL argument of [`Item::set_with_ttl`](crate::cache::Item::set_with_ttl).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Expire after a relative lifetime
    After(Lifetime),
    /// Expire at an absolute instant
    At(DateTime<Utc>),
}

impl Ttl {
    /// Resolves the TTL into an absolute expiration.
    pub fn expiration_from(self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        match self {
            Ttl::After(lifetime) => lifetime.expiration_from(now),
            Ttl::At(at) => Ok(at),
        }
    }
}

impl From<Lifetime> for Ttl {
    fn from(lifetime: Lifetime) -> Self {
        Ttl::After(lifetime)
    }
}

impl From<i32> for Ttl {
    fn from(secs: i32) -> Self {
        Ttl::After(secs.into())
    }
}

impl From<i64> for Ttl {
    fn from(secs: i64) -> Self {
        Ttl::After(secs.into())
    }
}

impl From<TimeDelta> for Ttl {
    fn from(delta: TimeDelta) -> Self {
        Ttl::After(delta.into())
    }
}

impl From<StdDuration> for Ttl {
    fn from(duration: StdDuration) -> Self {
        Ttl::After(duration.into())
    }
}

impl From<DateTime<Utc>> for Ttl {
    fn from(at: DateTime<Utc>) -> Self {
        Ttl::At(at)
    }
}

impl From<SystemTime> for Ttl {
    fn from(at: SystemTime) -> Self {
        Ttl::At(at.into())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_lifetime() {
        let now = Utc::now();
        let expiration = Lifetime::from(10).expiration_from(now).unwrap();
        assert_eq!(expiration - now, TimeDelta::seconds(10));
    }

    #[test]
    fn test_negative_lifetime_is_accepted() {
        let now = Utc::now();
        let expiration = Lifetime::from(-10).expiration_from(now).unwrap();
        assert!(expiration < now);
    }

    #[test]
    fn test_std_duration_lifetime() {
        let now = Utc::now();
        let expiration = Lifetime::from(StdDuration::from_secs(90))
            .expiration_from(now)
            .unwrap();
        assert_eq!(expiration - now, TimeDelta::seconds(90));
    }

    #[test]
    fn test_out_of_range_lifetime() {
        let result = Lifetime::from(i64::MAX).expiration_from(Utc::now());
        assert!(matches!(result, Err(CacheError::InvalidArgument(_))));

        let result = Lifetime::from(StdDuration::from_secs(u64::MAX)).to_delta();
        assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
    }

    #[test]
    fn test_absolute_ttl() {
        let at = Utc::now() + TimeDelta::seconds(30);
        assert_eq!(Ttl::from(at).expiration_from(Utc::now()).unwrap(), at);
    }
}
