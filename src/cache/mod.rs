//! In-process repository cache with stale-on-error and static fallback.
//!
//! Per key the lifecycle is `Empty -> Fresh -> Stale -> Fresh`. Entries are
//! only written after a successful upstream fetch and are never evicted when
//! they expire, so an expired entry is still available when upstream fails.
//! Only [`RepositoryCache::clear_cache`] removes entries.
//!
//! Concurrent fetches of the same stale key are not coalesced: each caller
//! issues its own upstream request and the last one to finish wins.

mod entry;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::model::{Profile, RepositorySummary};
use crate::source::RepositorySource;

pub use entry::{CacheEntry, CacheStats, CachedValue, DataOrigin, Fetched};

const PINNED_PREFIX: &str = "pinned_repos_";
const PROFILE_PREFIX: &str = "profile_";

/// Cache key for an account's selected repositories.
pub fn pinned_key(account: &str) -> String {
    format!("{}{}", PINNED_PREFIX, account)
}

/// Cache key for an account's profile.
pub fn profile_key(account: &str) -> String {
    format!("{}{}", PROFILE_PREFIX, account)
}

pub struct RepositoryCache<S: RepositorySource, C: Clock = SystemClock> {
    source: S,
    clock: C,
    config: CacheConfig,
    entries: Mutex<HashMap<String, CacheEntry<CachedValue>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<S: RepositorySource> RepositoryCache<S, SystemClock> {
    pub fn new(source: S, config: CacheConfig) -> Self {
        Self::with_clock(source, SystemClock, config)
    }
}

impl<S: RepositorySource, C: Clock> RepositoryCache<S, C> {
    pub fn with_clock(source: S, clock: C, config: CacheConfig) -> Self {
        Self {
            source,
            clock,
            config,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Selected repositories for `account`. Never fails.
    pub async fn fetch_pinned_repositories(&self, account: &str) -> Vec<RepositorySummary> {
        self.fetch_pinned_repositories_with_origin(account).await.data
    }

    /// Selected repositories for `account`, tagged with where they came from.
    ///
    /// A fresh entry is returned without touching upstream. Otherwise one
    /// upstream fetch is made; on success the selection is stored and
    /// returned, on failure the existing entry (however old) or else the
    /// fallback dataset is returned. The fallback is never stored.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_pinned_repositories_with_origin(
        &self,
        account: &str,
    ) -> Fetched<Vec<RepositorySummary>> {
        let key = pinned_key(account);

        if let Some(CachedValue::Repositories(repos)) = self.lookup_fresh(&key) {
            return Fetched::new(repos, DataOrigin::Cache);
        }

        match self
            .source
            .list_repositories(account, self.config.page_size)
            .await
        {
            Ok(raw) => {
                let now = self.clock.now();
                let selected =
                    self.config
                        .selection
                        .select(&raw, account, now, &self.config.fallback);
                info!(
                    "Fetched {} repositories for {}, keeping {}",
                    raw.len(),
                    account,
                    selected.len()
                );
                self.store(key, CachedValue::Repositories(selected.clone()), now);
                Fetched::new(selected, DataOrigin::Live)
            }
            Err(e) => match self.lookup_any(&key) {
                Some(CachedValue::Repositories(repos)) => {
                    warn!(
                        "Failed to fetch repositories for {} ({}), serving stale cache",
                        account, e
                    );
                    Fetched::new(repos, DataOrigin::Stale)
                }
                _ => {
                    warn!(
                        "Failed to fetch repositories for {} ({}), serving fallback dataset",
                        account, e
                    );
                    Fetched::new(self.config.fallback.clone(), DataOrigin::Fallback)
                }
            },
        }
    }

    /// Profile of `account`.
    ///
    /// Fails with `UpstreamUnavailable` only when upstream fails and nothing
    /// is cached for the account.
    pub async fn fetch_profile(&self, account: &str) -> Result<Profile> {
        self.fetch_profile_with_origin(account)
            .await
            .map(|fetched| fetched.data)
    }

    #[tracing::instrument(skip(self))]
    pub async fn fetch_profile_with_origin(&self, account: &str) -> Result<Fetched<Profile>> {
        let key = profile_key(account);

        if let Some(CachedValue::Profile(profile)) = self.lookup_fresh(&key) {
            return Ok(Fetched::new(profile, DataOrigin::Cache));
        }

        match self.source.get_profile(account).await {
            Ok(profile) => {
                let now = self.clock.now();
                self.store(key, CachedValue::Profile(profile.clone()), now);
                Ok(Fetched::new(profile, DataOrigin::Live))
            }
            Err(e) => match self.lookup_any(&key) {
                Some(CachedValue::Profile(profile)) => {
                    warn!(
                        "Failed to fetch profile for {} ({}), serving stale cache",
                        account, e
                    );
                    Ok(Fetched::new(profile, DataOrigin::Stale))
                }
                _ => {
                    warn!("Failed to fetch profile for {}: {}", account, e);
                    Err(e.into_unavailable())
                }
            },
        }
    }

    /// True iff an entry exists under `key` and has not reached the ttl.
    pub fn is_cache_valid(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.entries()
            .get(key)
            .is_some_and(|entry| entry.is_fresh(now, self.config.ttl))
    }

    /// Drop every entry, fresh or stale.
    pub fn clear_cache(&self) {
        let mut entries = self.entries();
        let count = entries.len();
        entries.clear();
        info!("Cleared {} cache entries", count);
    }

    pub fn cache_stats(&self) -> CacheStats {
        let entries = self.entries();
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        CacheStats {
            size: entries.len(),
            keys,
            ttl: self.config.ttl,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<CachedValue>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fresh value under `key`, counting the hit or miss.
    fn lookup_fresh(&self, key: &str) -> Option<CachedValue> {
        let now = self.clock.now();
        let fresh = self
            .entries()
            .get(key)
            .filter(|entry| entry.is_fresh(now, self.config.ttl))
            .map(|entry| entry.value.clone());

        if fresh.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Cache hit for {}", key);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!("Cache miss for {}", key);
        }
        fresh
    }

    /// Value under `key` regardless of age.
    fn lookup_any(&self, key: &str) -> Option<CachedValue> {
        self.entries().get(key).map(|entry| entry.value.clone())
    }

    fn store(&self, key: String, value: CachedValue, now: DateTime<Utc>) {
        debug!("Storing cache entry {}", key);
        self.entries().insert(key, CacheEntry::new(value, now));
    }
}

impl<S: RepositorySource, C: Clock> std::fmt::Debug for RepositoryCache<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryCache")
            .field("api_url", &self.source.api_url())
            .field("stats", &self.cache_stats())
            .finish()
    }
}
