//! Cache entry and reporting types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::model::{Profile, RepositorySummary};

/// Value stored under a cache key.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Repositories(Vec<RepositorySummary>),
    Profile(Profile),
}

/// A cached value with the time it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub value: T,
    pub stored_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, stored_at: DateTime<Utc>) -> Self {
        Self { value, stored_at }
    }

    /// Fresh while `now - stored_at < ttl`. An entry stored "in the future"
    /// (clock moved backwards) counts as just stored.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let elapsed = now
            .signed_duration_since(self.stored_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        elapsed < ttl
    }

    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        !self.is_fresh(now, ttl)
    }
}

/// Where a returned value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    /// Fetched from upstream during this call.
    Live,
    /// Served from a fresh cache entry.
    Cache,
    /// Upstream failed; served from an expired cache entry.
    Stale,
    /// Upstream failed with nothing cached; served the static dataset.
    Fallback,
}

impl DataOrigin {
    pub fn is_live(self) -> bool {
        self == DataOrigin::Live
    }
}

/// A value together with its origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched<T> {
    pub data: T,
    pub origin: DataOrigin,
}

impl<T> Fetched<T> {
    pub fn new(data: T, origin: DataOrigin) -> Self {
        Self { data, origin }
    }
}

/// Snapshot of cache contents for operational visibility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
    #[serde(serialize_with = "serialize_secs")]
    pub ttl: Duration,
    pub hits: u64,
    pub misses: u64,
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_secs())
}
