//! Error path tests for the manifest and workspace file readers
//!
//! These tests verify that readers reject malformed, oversized, and edge case
//! inputs with a clear error instead of a guessed result.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use monorail_workspaces::Error;
use monorail_workspaces::parsers::{
    parse_workspace_members, read_cargo_manifest, read_package_manifest, read_pyproject,
    read_workspace_yaml,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const LIMIT: u64 = 1024 * 1024;

fn file(temp: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = temp.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

mod manifest_error_tests {
    use super::*;

    #[test]
    fn test_empty_file() {
        let temp = TempDir::new().unwrap();
        let path = file(&temp, "package.json", "");

        let result = read_package_manifest(&path, LIMIT);

        assert!(
            matches!(result, Err(Error::InvalidManifest { .. })),
            "Empty file should be rejected before decoding"
        );
    }

    #[test]
    fn test_invalid_json() {
        let temp = TempDir::new().unwrap();
        let path = file(&temp, "package.json", "{ invalid json }");

        let err = read_package_manifest(&path, LIMIT).unwrap_err();

        assert!(matches!(err, Error::Json { .. }));
        assert!(err.to_string().contains("package.json"));
    }

    #[test]
    fn test_workspaces_wrong_type() {
        let temp = TempDir::new().unwrap();
        let path = file(&temp, "package.json", r#"{"workspaces": "packages/*"}"#);

        assert!(
            read_package_manifest(&path, LIMIT).is_err(),
            "A string workspaces field is neither accepted form"
        );
    }

    #[test]
    fn test_oversized_manifest() {
        let temp = TempDir::new().unwrap();
        let padding = " ".repeat(4096);
        let path = file(&temp, "package.json", &format!("{{{padding}}}"));

        let err = read_package_manifest(&path, 1024).unwrap_err();

        match err {
            Error::ManifestTooLarge { size, limit, .. } => {
                assert!(size > limit);
                assert_eq!(limit, 1024);
            }
            other => panic!("Expected ManifestTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_manifest() {
        let temp = TempDir::new().unwrap();
        let err = read_package_manifest(&temp.path().join("package.json"), LIMIT).unwrap_err();
        assert!(matches!(err, Error::Io { path: Some(_), .. }));
    }
}

mod workspace_yaml_error_tests {
    use super::*;

    #[test]
    fn test_empty_file() {
        let temp = TempDir::new().unwrap();
        let path = file(&temp, "pnpm-workspace.yaml", "");

        let err = read_workspace_yaml(&path, LIMIT).unwrap_err();

        assert!(matches!(err, Error::InvalidWorkspaceConfig { .. }));
    }

    #[test]
    fn test_only_comments() {
        let temp = TempDir::new().unwrap();
        let path = file(&temp, "pnpm-workspace.yaml", "# packages:\n#  - a/*\n");

        assert!(read_workspace_yaml(&path, LIMIT).is_err());
    }

    #[test]
    fn test_anchors_and_documents_are_not_interpreted() {
        let temp = TempDir::new().unwrap();
        let path = file(
            &temp,
            "pnpm-workspace.yaml",
            "---\ndefaults: &defaults\n  - shared/*\npackages:\n  - apps/*\n---\npackages:\n  - other/*\n",
        );

        let entries = read_workspace_yaml(&path, LIMIT).unwrap();

        assert!(entries.contains(&"apps/*".to_string()));
        assert!(!entries.contains(&"shared/*".to_string()));
    }
}

mod toml_error_tests {
    use super::*;

    #[test]
    fn test_invalid_cargo_manifest() {
        let temp = TempDir::new().unwrap();
        let path = file(&temp, "Cargo.toml", "[package\nname = \"x\"");

        let err = read_cargo_manifest(&path, LIMIT).unwrap_err();

        assert!(matches!(err, Error::Toml { path: Some(_), .. }));
    }

    #[test]
    fn test_wrong_name_type() {
        let temp = TempDir::new().unwrap();
        let path = file(&temp, "pyproject.toml", "[tool.poetry]\nname = 42\n");

        assert!(read_pyproject(&path, LIMIT).is_err());
    }

    #[test]
    fn test_workspace_members_garbage_is_empty() {
        let members = parse_workspace_members("this is = not [ toml");
        assert!(members.members.is_empty());
        assert!(members.exclude.is_empty());
    }
}
