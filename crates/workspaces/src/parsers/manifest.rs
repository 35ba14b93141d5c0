//! JSON package manifest reader.

use super::read_text;
use crate::error::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// The fields of a `package.json` that detection and enumeration use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageManifest {
    /// Declared package name.
    #[serde(default)]
    pub name: Option<String>,
    /// Declared version.
    #[serde(default)]
    pub version: Option<String>,
    /// `"private": true` marks a package that is never published.
    #[serde(default)]
    pub private: bool,
    /// Workspace membership patterns.
    #[serde(default)]
    pub workspaces: Option<WorkspacesField>,
}

impl PackageManifest {
    /// Workspace patterns in either accepted form; empty when absent.
    #[must_use]
    pub fn workspace_patterns(&self) -> &[String] {
        match &self.workspaces {
            Some(WorkspacesField::Patterns(patterns)) => patterns,
            Some(WorkspacesField::Object { packages }) => packages,
            None => &[],
        }
    }

    /// The declared name, if it is non-empty.
    #[must_use]
    pub fn declared_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// The `workspaces` field: an array, or an object with a `packages` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WorkspacesField {
    /// `"workspaces": ["packages/*"]`
    Patterns(Vec<String>),
    /// `"workspaces": { "packages": ["packages/*"], "nohoist": [...] }`
    Object {
        /// Membership patterns.
        #[serde(default)]
        packages: Vec<String>,
    },
}

/// Checks that `content` looks like a JSON document and decodes it.
///
/// Anything that does not begin with `{` or `[` (after whitespace and a byte
/// order mark) is rejected before decoding. Malformed content is an error,
/// never a partial result.
///
/// # Errors
///
/// Returns [`Error::InvalidManifest`] for non-JSON content and
/// [`Error::Json`] when decoding fails.
pub fn parse_manifest<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T> {
    let body = content.trim_start_matches('\u{feff}').trim_start();
    if !body.starts_with(['{', '[']) {
        return Err(Error::InvalidManifest {
            path: path.to_path_buf(),
            message: "content does not start with '{' or '['".to_string(),
        });
    }
    serde_json::from_str(body).map_err(|source| Error::Json {
        source,
        path: Some(path.to_path_buf()),
    })
}

/// Reads and decodes a JSON manifest no larger than `max_size` bytes.
///
/// # Errors
///
/// Returns an error if the file is missing, oversized, or malformed.
pub fn read_manifest<T: DeserializeOwned>(path: &Path, max_size: u64) -> Result<T> {
    let content = read_text(path, max_size)?;
    parse_manifest(path, &content)
}

/// Reads a `package.json`.
///
/// # Errors
///
/// Same as [`read_manifest`].
pub fn read_package_manifest(path: &Path, max_size: u64) -> Result<PackageManifest> {
    read_manifest(path, max_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn parse(content: &str) -> Result<PackageManifest> {
        parse_manifest(Path::new("package.json"), content)
    }

    #[test]
    fn test_workspaces_array_form() {
        let manifest = parse(r#"{"name": "root", "workspaces": ["packages/*", "apps/*"]}"#).unwrap();
        assert_eq!(manifest.workspace_patterns(), ["packages/*", "apps/*"]);
        assert_eq!(manifest.declared_name(), Some("root"));
    }

    #[test]
    fn test_workspaces_object_form() {
        let manifest = parse(
            r#"{"private": true, "workspaces": {"packages": ["packages/*"], "nohoist": ["**/react"]}}"#,
        )
        .unwrap();
        assert_eq!(manifest.workspace_patterns(), ["packages/*"]);
        assert!(manifest.private);
        assert_eq!(manifest.declared_name(), None);
    }

    #[test]
    fn test_no_workspaces() {
        let manifest = parse(r#"{"name": "leaf", "version": "1.2.3"}"#).unwrap();
        assert!(manifest.workspace_patterns().is_empty());
        assert_eq!(manifest.version.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn test_blank_name_is_not_a_name() {
        let manifest = parse(r#"{"name": "  "}"#).unwrap();
        assert_eq!(manifest.declared_name(), None);
    }

    #[test]
    fn test_rejects_non_json_prefix() {
        let err = parse("name: yaml-ish").unwrap_err();
        assert!(matches!(err, Error::InvalidManifest { .. }));
        assert!(parse("").is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = parse(r#"{"name": "broken""#).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }

    #[test]
    fn test_array_is_structurally_accepted_but_not_a_package() {
        let value: serde_json::Value = parse_manifest(Path::new("x.json"), "[1, 2]").unwrap();
        assert!(value.is_array());
        assert!(parse("[1, 2]").is_err());
    }

    #[test]
    fn test_accepts_byte_order_mark() {
        let manifest = parse("\u{feff}  {\"name\": \"bom\"}").unwrap();
        assert_eq!(manifest.declared_name(), Some("bom"));
    }

    #[test]
    fn test_wrong_field_type_is_an_error() {
        assert!(parse(r#"{"name": 42}"#).is_err());
    }

    #[test]
    fn test_read_manifest_size_ceiling() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        let padding = " ".repeat(2048);
        fs::write(&path, format!("{{\"name\": \"big\"{padding}}}")).unwrap();

        assert!(read_package_manifest(&path, 1024).is_err());
        let manifest = read_package_manifest(&path, 1024 * 1024).unwrap();
        assert_eq!(manifest.declared_name(), Some("big"));
    }
}
