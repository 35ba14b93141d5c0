//! Configuration for detection, enumeration and caching.
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```toml
//! [detection]
//! max-depth = 3
//! ttl-secs = 300
//!
//! [glob]
//! max-results = 1000
//! max-depth = 16
//!
//! [manifest]
//! max-size = 1048576
//!
//! [enumeration]
//! ttl-secs = 300
//!
//! [cache]
//! default-ttl-secs = 300
//! max-entries = 512
//! lock-retries = 100
//! lock-retry-interval-ms = 1
//! sweep-interval-secs = 60
//! ```

use crate::error::{Error, Result};
use monorail_cache::CacheConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Size ceiling for any single parsed manifest.
pub const DEFAULT_MAX_MANIFEST_SIZE: u64 = 1024 * 1024;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Upward walk for monorepo roots.
    pub detection: DetectionConfig,
    /// Glob expansion ceilings.
    pub glob: GlobConfig,
    /// Manifest reading limits.
    pub manifest: ManifestConfig,
    /// Enumeration caching.
    pub enumeration: EnumerationConfig,
    /// Cache behavior.
    pub cache: CacheSettings,
}

/// Detection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct DetectionConfig {
    /// Ancestors examined above the start directory.
    pub max_depth: usize,
    /// How long a detection result stays cached.
    pub ttl_secs: u64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            ttl_secs: 300,
        }
    }
}

/// Glob expansion ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct GlobConfig {
    /// Matches returned by a single pattern before expansion stops.
    pub max_results: usize,
    /// Directory levels explored below the root.
    pub max_depth: usize,
}

impl Default for GlobConfig {
    fn default() -> Self {
        Self {
            max_results: 1000,
            max_depth: 16,
        }
    }
}

/// Manifest reading limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ManifestConfig {
    /// Files larger than this many bytes are treated as unreadable.
    pub max_size: u64,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_MANIFEST_SIZE,
        }
    }
}

/// Enumeration caching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct EnumerationConfig {
    /// How long an enumeration stays cached.
    pub ttl_secs: u64,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

/// Cache settings as written in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CacheSettings {
    /// TTL for callers that do not pick one.
    pub default_ttl_secs: u64,
    /// Entry ceiling; unset means unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,
    /// Attempts a writer makes to take a busy key lock.
    pub lock_retries: u32,
    /// Pause between lock attempts.
    pub lock_retry_interval_ms: u64,
    /// Minimum spacing between opportunistic sweeps.
    pub sweep_interval_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        let defaults = CacheConfig::default();
        Self {
            default_ttl_secs: defaults.default_ttl.as_secs(),
            max_entries: defaults.max_entries,
            lock_retries: defaults.lock_retries,
            lock_retry_interval_ms: u64::try_from(defaults.lock_retry_interval.as_millis())
                .unwrap_or(u64::MAX),
            sweep_interval_secs: defaults.sweep_interval.as_secs(),
        }
    }
}

impl Config {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML, has unknown keys,
    /// or fails [`Config::validate`].
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(e, path, "reading configuration"))?;
        let config: Self = toml::from_str(&content).map_err(|source| Error::Toml {
            source,
            path: Some(path.to_path_buf()),
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Rejects settings that would make scans or the cache unusable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first offending value.
    pub fn validate(&self) -> Result<()> {
        if self.glob.max_results == 0 {
            return Err(Error::config("glob.max-results must be at least 1"));
        }
        if self.manifest.max_size == 0 {
            return Err(Error::config("manifest.max-size must be at least 1"));
        }
        self.cache_config()
            .validate()
            .map_err(|e| Error::config(e.to_string()))
    }

    /// Detection TTL.
    #[must_use]
    pub const fn detection_ttl(&self) -> Duration {
        Duration::from_secs(self.detection.ttl_secs)
    }

    /// Enumeration TTL.
    #[must_use]
    pub const fn enumeration_ttl(&self) -> Duration {
        Duration::from_secs(self.enumeration.ttl_secs)
    }

    /// Settings for the cache crate.
    #[must_use]
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            default_ttl: Duration::from_secs(self.cache.default_ttl_secs),
            max_entries: self.cache.max_entries,
            lock_retries: self.cache.lock_retries,
            lock_retry_interval: Duration::from_millis(self.cache.lock_retry_interval_ms),
            sweep_interval: Duration::from_secs(self.cache.sweep_interval_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.detection.max_depth, 3);
        assert_eq!(config.manifest.max_size, 1_048_576);
        assert_eq!(config.cache_config(), CacheConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_toml_str(
            r"
            [detection]
            max-depth = 5

            [cache]
            max-entries = 64
            ",
        )
        .unwrap();
        assert_eq!(config.detection.max_depth, 5);
        assert_eq!(config.detection.ttl_secs, 300);
        assert_eq!(config.cache_config().max_entries, Some(64));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Config::from_toml_str("[detection]\nmax_depth = 5\n").is_err());
        assert!(Config::from_toml_str("[picker]\nbackend = \"fzf\"\n").is_err());
    }

    #[test]
    fn test_validation_rejects_zero_ceilings() {
        assert!(Config::from_toml_str("[glob]\nmax-results = 0\n").is_err());
        assert!(Config::from_toml_str("[manifest]\nmax-size = 0\n").is_err());
        assert!(Config::from_toml_str("[cache]\nlock-retries = 0\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("monorail.toml");
        fs::write(&path, "[enumeration]\nttl-secs = 10\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.enumeration_ttl(), Duration::from_secs(10));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Config::load(Path::new("/nonexistent/monorail.toml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
