//! Readers for the files that declare workspaces and packages.
//!
//! These are deliberately narrow. Each extracts one fixed shape of data and
//! rejects or ignores anything else:
//!
//! - [`manifest`]: JSON package manifests (`package.json`, `project.json`,
//!   `nx.json`, `lerna.json`), size-capped and structurally checked.
//! - [`workspace_yaml`]: the `packages:` list of `pnpm-workspace.yaml`, read
//!   line by line. Not a YAML parser.
//! - [`workspace_toml`]: `[workspace] members`/`exclude` of `Cargo.toml` and
//!   table-presence checks, read line by line.
//! - [`project_toml`]: package identity and dependency tables of member
//!   `Cargo.toml`/`pyproject.toml` files.

pub mod manifest;
pub mod project_toml;
pub mod workspace_toml;
pub mod workspace_yaml;

pub use manifest::{PackageManifest, WorkspacesField, read_manifest, read_package_manifest};
pub use project_toml::{CargoManifest, PyProject, read_cargo_manifest, read_pyproject};
pub use workspace_toml::{WorkspaceMembers, has_table, parse_workspace_members};
pub use workspace_yaml::{parse_workspace_yaml, read_workspace_yaml};

use crate::error::{Error, Result};
use std::path::Path;

/// Reads a text file, refusing files above `max_size` bytes.
///
/// # Errors
///
/// Returns [`Error::ManifestTooLarge`] for oversized files and [`Error::Io`]
/// when the file cannot be read.
pub fn read_text(path: &Path, max_size: u64) -> Result<String> {
    let metadata = std::fs::metadata(path).map_err(|e| Error::io(e, path, "reading metadata"))?;
    if metadata.len() > max_size {
        return Err(Error::ManifestTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit: max_size,
        });
    }
    std::fs::read_to_string(path).map_err(|e| Error::io(e, path, "reading file"))
}

/// Removes a trailing `#` comment that is not inside a quoted string.
pub(crate) fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut previous = ' ';
    for (index, ch) in line.char_indices() {
        match quote {
            Some(open) if ch == open && previous != '\\' => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch == '#' && previous.is_whitespace() => return &line[..index],
            None => {}
        }
        previous = ch;
    }
    line
}
