//! Key-prefixed views of a [`Cache`].

use crate::error::Result;
use crate::store::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;

/// Separator between a namespace name and the caller's key.
pub const NAMESPACE_SEPARATOR: char = ':';

/// A view of a cache where every key is prefixed with `name:`.
///
/// `cache.namespace("n").get(k)` reads exactly what `cache.get("n:k")` reads.
#[derive(Debug, Clone)]
pub struct Namespace<'a> {
    cache: &'a Cache,
    prefix: String,
}

impl<'a> Namespace<'a> {
    pub(crate) fn new(cache: &'a Cache, name: &str) -> Self {
        Self {
            cache,
            prefix: format!("{name}{NAMESPACE_SEPARATOR}"),
        }
    }

    /// The full key a namespaced key maps to.
    #[must_use]
    pub fn key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    /// See [`Cache::set`].
    ///
    /// # Errors
    ///
    /// Returns an error when the key lock times out or the value cannot be stored.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        self.cache.set(&self.key(key), value, ttl)
    }

    /// See [`Cache::set_with_file`].
    ///
    /// # Errors
    ///
    /// Returns an error when the key lock times out or the value cannot be stored.
    pub fn set_with_file<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        file: &Path,
        ttl: Duration,
    ) -> Result<()> {
        self.cache.set_with_file(&self.key(key), value, file, ttl)
    }

    /// See [`Cache::get`].
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.cache.get(&self.key(key))
    }

    /// See [`Cache::get_with_file`].
    #[must_use]
    pub fn get_with_file<T: DeserializeOwned>(&self, key: &str, file: &Path) -> Option<T> {
        self.cache.get_with_file(&self.key(key), file)
    }

    /// See [`Cache::delete`].
    ///
    /// # Errors
    ///
    /// Returns an error when a writer holds the key.
    pub fn delete(&self, key: &str) -> Result<bool> {
        self.cache.delete(&self.key(key))
    }

    /// Removes every entry in this namespace.
    ///
    /// # Errors
    ///
    /// Returns an error when in-flight writes do not drain.
    pub fn clear(&self) -> Result<usize> {
        self.cache.clear_prefix(&self.prefix)
    }
}
