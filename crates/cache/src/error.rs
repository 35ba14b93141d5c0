//! Error types for the cache crate

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for cache operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Another writer held the key lock for every retry
    #[error("Timed out acquiring cache lock for '{key}' after {attempts} attempts")]
    #[diagnostic(
        code(monorail::cache::lock_timeout),
        help("A concurrent refresh is still writing this key; retry the operation once it finishes")
    )]
    LockTimeout {
        /// Key whose lock could not be acquired
        key: String,
        /// Number of acquisition attempts made
        attempts: u32,
    },

    /// I/O error while inspecting a watched file
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(monorail::cache::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "stat")
        operation: String,
    },

    /// Configuration or validation error
    #[error("Cache configuration error: {message}")]
    #[diagnostic(code(monorail::cache::config))]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Value could not be converted to or from its stored form
    #[error("Serialization error: {message}")]
    #[diagnostic(code(monorail::cache::serialization))]
    Serialization {
        /// Error message describing the serialization issue
        message: String,
    },
}

impl Error {
    /// Create a lock timeout error
    #[must_use]
    pub fn lock_timeout(key: impl Into<String>, attempts: u32) -> Self {
        Self::LockTimeout {
            key: key.into(),
            attempts,
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create a serialization error
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
        }
    }

    /// Whether this error is a lock acquisition timeout
    #[must_use]
    pub const fn is_lock_timeout(&self) -> bool {
        matches!(self, Self::LockTimeout { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::serialization(source.to_string())
    }
}

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, Error>;
