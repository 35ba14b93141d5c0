//! Error types for workspace operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for workspace operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during workspace operations.
///
/// None of these escape enumeration: enumerators log them and skip the
/// offending file. They surface from the lower-level readers and from
/// configuration loading.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Manifest exceeds the size ceiling.
    #[error("Manifest at {path} is {size} bytes, above the {limit} byte limit")]
    #[diagnostic(
        code(monorail::workspaces::manifest_too_large),
        help("Raise `manifest.max-size` if this manifest is legitimately large")
    )]
    ManifestTooLarge {
        /// Path to the oversized file.
        path: PathBuf,
        /// Size of the file in bytes.
        size: u64,
        /// Configured ceiling in bytes.
        limit: u64,
    },

    /// Manifest content does not have the expected structure.
    #[error("Invalid manifest at {path}: {message}")]
    #[diagnostic(
        code(monorail::workspaces::invalid_manifest),
        help("Manifests must be JSON documents starting with '{{' or '['")
    )]
    InvalidManifest {
        /// Path to the invalid manifest.
        path: PathBuf,
        /// Description of what is invalid.
        message: String,
    },

    /// Invalid workspace configuration.
    #[error("Invalid workspace configuration at {path}: {message}")]
    #[diagnostic(
        code(monorail::workspaces::invalid_config),
        help(
            "Check the workspace configuration file for syntax errors or missing required fields"
        )
    )]
    InvalidWorkspaceConfig {
        /// Path to the invalid configuration file.
        path: PathBuf,
        /// Description of what is invalid.
        message: String,
    },

    /// Invalid monorail configuration.
    #[error("Invalid configuration: {message}")]
    #[diagnostic(
        code(monorail::workspaces::config),
        help("Check the configuration values against the documented defaults")
    )]
    Config {
        /// Description of what is invalid.
        message: String,
    },

    /// I/O error occurred.
    #[error("I/O error during {operation}{}: {source}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(monorail::workspaces::io_error),
        help("Check that the referenced paths exist and that you have permission to read them")
    )]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// Optional path where the error occurred.
        path: Option<PathBuf>,
        /// Description of the operation being performed.
        operation: String,
    },

    /// JSON parsing error.
    #[error("JSON parsing error{}: {source}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(monorail::workspaces::json_error),
        help("Ensure the JSON has valid syntax and matches the expected manifest shape")
    )]
    Json {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
        /// Optional path to the file being parsed.
        path: Option<PathBuf>,
    },

    /// Cache operation failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Cache(#[from] monorail_cache::Error),

    /// TOML parsing error.
    #[error("TOML parsing error{}: {source}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(monorail::workspaces::toml_error),
        help("Ensure the TOML has valid syntax and matches the expected manifest shape")
    )]
    Toml {
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
        /// Optional path to the file being parsed.
        path: Option<PathBuf>,
    },
}

impl Error {
    pub(crate) fn io(source: std::io::Error, path: &std::path::Path, operation: &str) -> Self {
        Self::Io {
            source,
            path: Some(path.to_path_buf()),
            operation: operation.to_string(),
        }
    }

    pub(crate) fn invalid_config(path: &std::path::Path, message: impl Into<String>) -> Self {
        Self::InvalidWorkspaceConfig {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            path: None,
            operation: "file operation".to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Json { source, path: None }
    }
}

impl From<toml::de::Error> for Error {
    fn from(source: toml::de::Error) -> Self {
        Self::Toml { source, path: None }
    }
}
