//! The cache store.

use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::entry::{CacheEntry, file_mtime};
use crate::error::Result;
use crate::lock::KeyLocks;
use crate::namespace::Namespace;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Counters describing cache activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Live entries, including ones not yet lazily expired.
    pub entries: usize,
    /// Reads that returned a value.
    pub hits: u64,
    /// Reads that returned nothing.
    pub misses: u64,
    /// Successful writes.
    pub sets: u64,
    /// Entries removed by the size ceiling.
    pub evictions: u64,
    /// Entries removed because their TTL ran out.
    pub expirations: u64,
    /// Entries removed because their watched file changed.
    pub invalidations: u64,
    /// Writes refused because the key lock stayed busy.
    pub lock_timeouts: u64,
}

#[derive(Debug)]
struct State {
    entries: HashMap<String, CacheEntry>,
    next_sequence: u64,
    last_sweep: DateTime<Utc>,
    stats: CacheStats,
}

enum Lookup {
    Hit(serde_json::Value),
    Miss,
}

/// TTL-bounded key/value store with optional file-mtime invalidation.
///
/// Values go in and come out as `serde_json::Value` snapshots, so a caller
/// never shares a stored value by reference.
#[derive(Debug)]
pub struct Cache {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<State>,
    locks: KeyLocks,
}

impl Default for Cache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl Cache {
    /// Creates a cache driven by the wall clock.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a cache driven by `clock`.
    #[must_use]
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        let locks = KeyLocks::new(config.lock_retries, config.lock_retry_interval);
        Self {
            config,
            clock,
            state: Mutex::new(State {
                entries: HashMap::new(),
                next_sequence: 0,
                last_sweep: now,
                stats: CacheStats::default(),
            }),
            locks,
        }
    }

    /// The configured default TTL.
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        self.config.default_ttl
    }

    /// The cache settings.
    #[must_use]
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock()
    }

    /// Stores `value` under `key` for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`](crate::Error::LockTimeout) when another writer holds the key for the
    /// whole retry budget, or [`Error::Serialization`](crate::Error::Serialization) when the value cannot be
    /// converted.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        self.write(key, value, None, ttl)
    }

    /// Stores `value` under `key`, invalidated once `file` changes.
    ///
    /// # Errors
    ///
    /// Same as [`Cache::set`].
    pub fn set_with_file<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        file: &Path,
        ttl: Duration,
    ) -> Result<()> {
        self.write(key, value, Some(file), ttl)
    }

    fn write<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        file: Option<&Path>,
        ttl: Duration,
    ) -> Result<()> {
        let guard = match self.locks.acquire(key) {
            Ok(guard) => guard,
            Err(e) => {
                self.state().stats.lock_timeouts += 1;
                tracing::warn!(key, "Cache write dropped: {e}");
                return Err(e);
            }
        };

        let value = serde_json::to_value(value)?;
        let file_mtime = file.and_then(file_mtime);
        let now = self.clock.now();
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        {
            let mut state = self.state();
            let sequence = state.next_sequence;
            state.next_sequence += 1;
            state.entries.insert(
                key.to_string(),
                CacheEntry {
                    value,
                    created_at: now,
                    expires_at,
                    access_count: 0,
                    file_path: file.map(Path::to_path_buf),
                    file_mtime,
                    sequence,
                },
            );
            state.stats.sets += 1;
            self.evict_over_ceiling(&mut state);
        }
        drop(guard);

        tracing::trace!(key, ttl_secs = ttl.as_secs(), "Cache set");
        self.maybe_sweep();
        Ok(())
    }

    fn evict_over_ceiling(&self, state: &mut State) {
        let Some(max) = self.config.max_entries else {
            return;
        };
        while state.entries.len() > max {
            let oldest = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.sequence)
                .map(|(key, _)| key.clone());
            let Some(oldest) = oldest else { break };
            state.entries.remove(&oldest);
            state.stats.evictions += 1;
            tracing::debug!(key = %oldest, "Evicted oldest cache entry");
        }
    }

    /// Reads `key`, dropping it if it expired or its watched file changed.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let found = self.lookup(key, None);
        Self::decode(key, found)
    }

    /// Reads `key`, dropping it if it expired or `file` changed since the write.
    #[must_use]
    pub fn get_with_file<T: DeserializeOwned>(&self, key: &str, file: &Path) -> Option<T> {
        let found = self.lookup(key, Some(file));
        Self::decode(key, found)
    }

    fn decode<T: DeserializeOwned>(key: &str, found: Lookup) -> Option<T> {
        match found {
            Lookup::Hit(value) => match serde_json::from_value(value) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    tracing::warn!(key, "Cached value has an unexpected shape: {e}");
                    None
                }
            },
            Lookup::Miss => None,
        }
    }

    fn lookup(&self, key: &str, file: Option<&Path>) -> Lookup {
        let now = self.clock.now();
        let mut state = self.state();

        let Some(entry) = state.entries.get_mut(key) else {
            state.stats.misses += 1;
            return Lookup::Miss;
        };

        if entry.is_expired(now) {
            state.entries.remove(key);
            state.stats.expirations += 1;
            state.stats.misses += 1;
            tracing::trace!(key, "Cache entry expired");
            return Lookup::Miss;
        }

        let stale = file.map_or_else(|| entry.is_stale(), |file| entry.is_stale_for(file));
        if stale {
            state.entries.remove(key);
            state.stats.invalidations += 1;
            state.stats.misses += 1;
            tracing::debug!(key, "Cache entry invalidated by file change");
            return Lookup::Miss;
        }

        entry.access_count += 1;
        let value = entry.value.clone();
        state.stats.hits += 1;
        Lookup::Hit(value)
    }

    /// Returns a copy of the raw entry for `key` without touching its counters.
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.state().entries.get(key).cloned()
    }

    /// Removes `key`, returning whether it was present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`](crate::Error::LockTimeout) when a writer holds the key.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let _guard = self.locks.acquire(key)?;
        Ok(self.state().entries.remove(key).is_some())
    }

    /// A view of this cache that prefixes every key with `name:`.
    #[must_use]
    pub fn namespace(&self, name: &str) -> Namespace<'_> {
        Namespace::new(self, name)
    }

    /// Removes every entry whose key starts with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`](crate::Error::LockTimeout) when in-flight writes do not drain.
    pub fn clear_prefix(&self, prefix: &str) -> Result<usize> {
        let _global = self.locks.acquire_global()?;
        let mut state = self.state();
        let before = state.entries.len();
        state.entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - state.entries.len();
        tracing::debug!(prefix, removed, "Cleared cache entries");
        Ok(removed)
    }

    /// Removes every entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`](crate::Error::LockTimeout) when in-flight writes do not drain.
    pub fn clear_all(&self) -> Result<usize> {
        self.clear_prefix("")
    }

    /// Removes expired entries and entries whose watched file changed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`](crate::Error::LockTimeout) when in-flight writes do not drain.
    pub fn sweep(&self) -> Result<usize> {
        let _global = self.locks.acquire_global()?;
        let now = self.clock.now();
        let mut state = self.state();
        let mut expired = 0_usize;
        let mut invalidated = 0_usize;
        state.entries.retain(|_, entry| {
            if entry.is_expired(now) {
                expired += 1;
                false
            } else if entry.is_stale() {
                invalidated += 1;
                false
            } else {
                true
            }
        });
        state.stats.expirations += u64::try_from(expired).unwrap_or(u64::MAX);
        state.stats.invalidations += u64::try_from(invalidated).unwrap_or(u64::MAX);
        state.last_sweep = now;
        let removed = expired + invalidated;
        if removed > 0 {
            tracing::debug!(expired, invalidated, "Swept cache");
        }
        Ok(removed)
    }

    fn maybe_sweep(&self) {
        let now = self.clock.now();
        let due = {
            let state = self.state();
            TimeDelta::from_std(self.config.sweep_interval)
                .ok()
                .and_then(|interval| state.last_sweep.checked_add_signed(interval))
                .is_some_and(|next| now >= next)
        };
        if due && let Err(e) = self.sweep() {
            tracing::debug!("Skipped periodic sweep: {e}");
        }
    }

    /// Snapshot of the activity counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let state = self.state();
        CacheStats {
            entries: state.entries.len(),
            ..state.stats
        }
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn locks(&self) -> &KeyLocks {
        &self.locks
    }
}
