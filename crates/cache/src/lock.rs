//! Advisory per-key locks and the global sweep lock.
//!
//! A writer holds its key's lock for the duration of a mutation. A second
//! writer on the same key retries a bounded number of times and then fails.
//! The global lock first stops new key locks from being granted, then waits
//! for the held ones to drain.

use crate::error::{Error, Result};
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashSet;
use std::time::Duration;

/// Key reported in timeouts of the global lock.
pub(crate) const GLOBAL_LOCK_KEY: &str = "*";

#[derive(Debug, Default)]
struct LockTable {
    held: HashSet<String>,
    draining: bool,
}

#[derive(Debug)]
pub(crate) struct KeyLocks {
    table: Mutex<LockTable>,
    retries: u32,
    interval: Duration,
}

impl KeyLocks {
    pub(crate) fn new(retries: u32, interval: Duration) -> Self {
        Self {
            table: Mutex::new(LockTable::default()),
            retries: retries.max(1),
            interval,
        }
    }

    fn table(&self) -> MutexGuard<'_, LockTable> {
        self.table.lock()
    }

    fn pause(&self, attempt: u32) {
        if attempt < self.retries {
            if self.interval.is_zero() {
                std::thread::yield_now();
            } else {
                std::thread::sleep(self.interval);
            }
        }
    }

    /// Takes the lock for `key`.
    pub(crate) fn acquire(&self, key: &str) -> Result<KeyGuard<'_>> {
        for attempt in 1..=self.retries {
            {
                let mut table = self.table();
                if !table.draining && table.held.insert(key.to_string()) {
                    return Ok(KeyGuard {
                        locks: self,
                        key: key.to_string(),
                    });
                }
            }
            tracing::trace!(key, attempt, "Cache key lock busy");
            self.pause(attempt);
        }
        Err(Error::lock_timeout(key, self.retries))
    }

    /// Takes the global lock once every key lock has been released.
    pub(crate) fn acquire_global(&self) -> Result<GlobalGuard<'_>> {
        let mut attempt = 1;
        loop {
            {
                let mut table = self.table();
                if !table.draining {
                    table.draining = true;
                    break;
                }
            }
            if attempt >= self.retries {
                return Err(Error::lock_timeout(GLOBAL_LOCK_KEY, self.retries));
            }
            self.pause(attempt);
            attempt += 1;
        }

        let guard = GlobalGuard { locks: self };
        for attempt in 1..=self.retries {
            if self.table().held.is_empty() {
                return Ok(guard);
            }
            tracing::trace!(attempt, "Waiting for cache key locks to drain");
            self.pause(attempt);
        }
        // Dropping the guard lifts the drain so writers can proceed again.
        drop(guard);
        Err(Error::lock_timeout(GLOBAL_LOCK_KEY, self.retries))
    }

    #[cfg(test)]
    pub(crate) fn held_count(&self) -> usize {
        self.table().held.len()
    }
}

/// Releases its key lock on drop.
#[derive(Debug)]
pub(crate) struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.locks.table().held.remove(&self.key);
    }
}

/// Releases the global lock on drop.
#[derive(Debug)]
pub(crate) struct GlobalGuard<'a> {
    locks: &'a KeyLocks,
}

impl Drop for GlobalGuard<'_> {
    fn drop(&mut self) {
        self.locks.table().draining = false;
    }
}
