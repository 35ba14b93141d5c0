//! The facade front ends talk to.
//!
//! A [`Navigator`] owns the configuration and a [`Cache`], and threads them
//! through detection and enumeration. There is no process-wide "current
//! workspace": callers keep the [`DetectionResult`] that [`Navigator::detect`]
//! returns and pass it back in.

use crate::config::Config;
use crate::dependencies;
use crate::discovery::{self, Limits};
use crate::error::Result;
use crate::types::{Dependency, DetectionResult, EnumerateOptions, Package, Subtype};
use monorail_cache::Cache;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Cache namespace for detection results.
pub const DETECTION_NAMESPACE: &str = "detection";
/// Cache namespace for enumerations.
pub const PACKAGES_NAMESPACE: &str = "packages";

/// Cached detection and enumeration over one configuration.
#[derive(Debug, Clone)]
pub struct Navigator {
    config: Config,
    cache: Arc<Cache>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Navigator {
    /// Creates a navigator with its own cache built from `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let cache = Arc::new(Cache::new(config.cache_config()));
        Self { config, cache }
    }

    /// Creates a navigator over a shared cache.
    #[must_use]
    pub const fn with_cache(config: Config, cache: Arc<Cache>) -> Self {
        Self { config, cache }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The backing cache.
    #[must_use]
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    fn limits(&self) -> Limits {
        Limits::from_config(&self.config)
    }

    /// Detects the monorepo containing `start` within the configured depth.
    #[must_use]
    pub fn detect(&self, start: &Path) -> Option<DetectionResult> {
        self.detect_with_depth(start, self.config.detection.max_depth)
    }

    /// Detects the monorepo containing `start`, examining at most `max_depth` ancestors.
    ///
    /// Both outcomes are cached, so a directory outside any monorepo is not
    /// rescanned until the detection TTL runs out.
    #[must_use]
    pub fn detect_with_depth(&self, start: &Path, max_depth: usize) -> Option<DetectionResult> {
        let start = absolute(start);
        let key = format!("{}@{max_depth}", start.display());
        let namespace = self.cache.namespace(DETECTION_NAMESPACE);

        if let Some(cached) = namespace.get::<Option<DetectionResult>>(&key) {
            tracing::debug!(start = %start.display(), "Detection served from cache");
            return cached;
        }

        let detected = crate::detection::detect(&start, max_depth, self.config.manifest.max_size);
        if let Err(e) = namespace.set(&key, &detected, self.config.detection_ttl()) {
            tracing::warn!(key, error = %e, "Could not cache detection result");
        }
        detected
    }

    /// Lists the packages of the `subtype` workspace at `root`.
    ///
    /// Enumerations are cached until the TTL runs out or the workspace
    /// declaration file changes. Options are applied after the cache, so
    /// differently filtered calls share one scan.
    #[must_use]
    pub fn enumerate(
        &self,
        root: &Path,
        subtype: Subtype,
        options: &EnumerateOptions,
    ) -> Vec<Package> {
        let target = DetectionResult::new(subtype, absolute(root));
        let root = target.root.as_path();
        let declaration = target.declaration_path();
        let key = format!("{subtype}:{}", root.display());
        let namespace = self.cache.namespace(PACKAGES_NAMESPACE);

        let cached = namespace.get_with_file::<Vec<Package>>(&key, &declaration);
        let packages = if let Some(cached) = cached {
            tracing::debug!(root = %root.display(), %subtype, "Enumeration served from cache");
            cached
        } else {
            let packages = discovery::enumerate(root, subtype, self.limits());
            if let Err(e) = namespace.set_with_file(
                &key,
                &packages,
                &declaration,
                self.config.enumeration_ttl(),
            ) {
                tracing::warn!(key, error = %e, "Could not cache enumeration");
            }
            packages
        };

        options.apply(packages)
    }

    /// Lists the packages of a detected workspace.
    #[must_use]
    pub fn enumerate_detected(
        &self,
        detection: &DetectionResult,
        options: &EnumerateOptions,
    ) -> Vec<Package> {
        self.enumerate(&detection.root, detection.subtype, options)
    }

    /// Finds a package of the detected workspace by its declared name.
    #[must_use]
    pub fn get_package(&self, detection: &DetectionResult, name: &str) -> Option<Package> {
        self.enumerate_detected(detection, &EnumerateOptions::default())
            .into_iter()
            .find(|package| package.name == name)
    }

    /// Lists `package`'s declared dependencies.
    #[must_use]
    pub fn get_dependencies(&self, package: &Package) -> Vec<Dependency> {
        dependencies::get_dependencies(package, self.config.manifest.max_size)
    }

    /// Forgets every cached detection and enumeration.
    ///
    /// # Errors
    ///
    /// Returns an error when the cache cannot drain in-flight writes in time.
    pub fn reset(&self) -> Result<usize> {
        let cleared = [DETECTION_NAMESPACE, PACKAGES_NAMESPACE]
            .into_iter()
            .map(|name| self.cache.namespace(name).clear())
            .sum::<monorail_cache::Result<usize>>()?;
        tracing::debug!(cleared, "Reset navigator caches");
        Ok(cleared)
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
