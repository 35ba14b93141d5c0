//! Line-oriented reader for `pnpm-workspace.yaml`.
//!
//! Recognizes exactly one shape: a top-level `packages:` key followed by an
//! indented list of double-quoted, single-quoted or bare glob entries. Blank
//! lines and `#` comments are skipped, and lines outside that list are
//! ignored. Nested structures, anchors, flow sequences and multi-document
//! streams are not interpreted.

use super::{read_text, strip_comment};
use crate::error::{Error, Result};
use std::path::Path;

const PACKAGES_KEY: &str = "packages:";

/// Extracts the `packages:` entries, `!` prefixes preserved.
///
/// # Errors
///
/// Returns [`Error::InvalidWorkspaceConfig`] when the key is absent or its
/// list is empty.
pub fn parse_workspace_yaml(path: &Path, content: &str) -> Result<Vec<String>> {
    let mut entries = Vec::new();
    let mut found_key = false;
    let mut in_packages = false;

    for raw in content.lines() {
        let line = strip_comment(raw).trim_end();
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        let indent = line.len() - trimmed.len();

        if in_packages {
            if let Some(item) = list_item(trimmed) {
                if let Some(entry) = unquote(item) {
                    entries.push(entry);
                }
                continue;
            }
            in_packages = false;
        }

        if indent == 0 && trimmed == PACKAGES_KEY {
            found_key = true;
            in_packages = true;
        }
    }

    if !found_key {
        return Err(Error::invalid_config(path, "missing 'packages:' key"));
    }
    if entries.is_empty() {
        return Err(Error::invalid_config(path, "'packages:' list is empty"));
    }
    Ok(entries)
}

/// Reads and parses a workspace YAML file no larger than `max_size` bytes.
///
/// # Errors
///
/// Returns an error if the file cannot be read or lacks a non-empty
/// `packages:` list.
pub fn read_workspace_yaml(path: &Path, max_size: u64) -> Result<Vec<String>> {
    let content = read_text(path, max_size)?;
    parse_workspace_yaml(path, &content)
}

fn list_item(line: &str) -> Option<&str> {
    if line == "-" {
        return Some("");
    }
    line.strip_prefix("- ").map(str::trim)
}

fn unquote(item: &str) -> Option<String> {
    let value = if let Some(inner) = item.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        inner.replace("\\\"", "\"")
    } else if let Some(inner) = item.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        inner.replace("''", "'")
    } else {
        item.to_string()
    };
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<Vec<String>> {
        parse_workspace_yaml(Path::new("pnpm-workspace.yaml"), content)
    }

    #[test]
    fn test_quoted_and_bare_entries() {
        let entries = parse(
            "packages:\n  - \"packages/*\"\n  - 'apps/*'\n  - tools/cli\n  - \"!packages/*/test\"\n",
        )
        .unwrap();
        assert_eq!(
            entries,
            vec!["packages/*", "apps/*", "tools/cli", "!packages/*/test"]
        );
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let entries = parse(
            "# workspace\n\npackages:\n  # core libraries\n  - 'libs/**' # everything\n\n  - apps/*\n",
        )
        .unwrap();
        assert_eq!(entries, vec!["libs/**", "apps/*"]);
    }

    #[test]
    fn test_unindented_list() {
        let entries = parse("packages:\n- packages/*\n").unwrap();
        assert_eq!(entries, vec!["packages/*"]);
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let entries = parse(
            "catalog:\n  react: ^18.2.0\n  lodash: ^4\npackages:\n  - packages/*\nonlyBuiltDependencies:\n  - esbuild\n",
        )
        .unwrap();
        assert_eq!(entries, vec!["packages/*"]);
    }

    #[test]
    fn test_nested_packages_key_is_not_the_list() {
        let err = parse("settings:\n  packages:\n    - nested/*\n").unwrap_err();
        assert!(err.to_string().contains("missing 'packages:' key"));
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let err = parse("catalog:\n  react: ^18\n").unwrap_err();
        assert!(matches!(err, Error::InvalidWorkspaceConfig { .. }));
    }

    #[test]
    fn test_empty_list_is_an_error() {
        let err = parse("packages:\n\n# nothing yet\n").unwrap_err();
        assert!(err.to_string().contains("empty"));
        assert!(parse("packages:\n  - ''\n").is_err());
    }

    #[test]
    fn test_flow_sequence_is_not_interpreted() {
        assert!(parse("packages: ['packages/*']\n").is_err());
    }

    #[test]
    fn test_single_quote_escape() {
        let entries = parse("packages:\n  - 'it''s/*'\n").unwrap();
        assert_eq!(entries, vec!["it's/*"]);
    }
}
