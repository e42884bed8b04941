//! Time-expiring in-memory cache.

use mini_moka::sync::Cache;
use std::time::Duration;
use tracing::debug;

use crate::config::CacheConfig;

/// Outcome of a cache lookup.
///
/// A hit may carry `None`: "this key is known to have no value" is cached
/// too, so absent READMEs are not re-requested within the TTL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup<V> {
    Hit(Option<V>),
    Miss,
}

impl<V> CacheLookup<V> {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }
}

/// Key-value store whose entries expire a fixed time after being written.
///
/// Expired entries are dropped lazily on access.
pub struct ExpiringCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    name: &'static str,
    entries: Cache<String, Option<V>>,
    ttl: Duration,
}

impl<V> ExpiringCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache with the given TTL and the default capacity.
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self::with_capacity(name, ttl, CacheConfig::README_MAX_ENTRIES)
    }

    pub fn with_capacity(name: &'static str, ttl: Duration, max_entries: u64) -> Self {
        Self {
            name,
            entries: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(max_entries)
                .build(),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> CacheLookup<V> {
        match self.entries.get(&key.to_string()) {
            Some(value) => {
                debug!("{} cache hit for {}", self.name, key);
                CacheLookup::Hit(value)
            }
            None => CacheLookup::Miss,
        }
    }

    /// Store `value` (possibly `None`) for one TTL from now.
    pub fn set(&self, key: &str, value: Option<V>) {
        self.entries.insert(key.to_string(), value);
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.invalidate(&key.to_string());
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
