//! Cache tuning knobs.

use crate::error::{Error, Result};
use std::time::Duration;

/// Default time-to-live applied by callers that do not choose their own.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default number of attempts a writer makes before giving up on a key lock.
pub const DEFAULT_LOCK_RETRIES: u32 = 100;

/// Default pause between lock attempts.
pub const DEFAULT_LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(1);

/// Default minimum spacing between opportunistic sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Settings for a [`Cache`](crate::Cache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL used by [`Cache::default_ttl`](crate::Cache::default_ttl).
    pub default_ttl: Duration,
    /// Entry ceiling; once exceeded the oldest-written entries are evicted.
    pub max_entries: Option<usize>,
    /// Attempts a writer makes to take a key lock before failing.
    pub lock_retries: u32,
    /// Pause between lock attempts.
    pub lock_retry_interval: Duration,
    /// Minimum spacing between sweeps triggered from `set`.
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            max_entries: None,
            lock_retries: DEFAULT_LOCK_RETRIES,
            lock_retry_interval: DEFAULT_LOCK_RETRY_INTERVAL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl CacheConfig {
    /// Sets the entry ceiling.
    #[must_use]
    pub const fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    /// Sets the lock retry budget.
    #[must_use]
    pub const fn with_lock_retries(mut self, retries: u32, interval: Duration) -> Self {
        self.lock_retries = retries;
        self.lock_retry_interval = interval;
        self
    }

    /// Checks that the settings can drive a cache.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when `lock_retries` or `max_entries` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.lock_retries == 0 {
            return Err(Error::configuration("lock_retries must be at least 1"));
        }
        if self.max_entries == Some(0) {
            return Err(Error::configuration(
                "max_entries must be at least 1 when set",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CacheConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_ttl, Duration::from_secs(300));
        assert_eq!(config.max_entries, None);
    }

    #[test]
    fn test_zero_retries_rejected() {
        let config = CacheConfig::default().with_lock_retries(0, Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_ceiling_rejected() {
        let config = CacheConfig::default().with_max_entries(0);
        assert!(config.validate().is_err());
    }
}
