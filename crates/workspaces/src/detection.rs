//! Monorepo root detection.
//!
//! Each directory is tested against the workspace conventions in a fixed
//! order; the first convention whose signature is fully satisfied wins:
//!
//! 1. Nx: `nx.json` holding a JSON object
//! 2. Lerna: `lerna.json` holding a JSON object
//! 3. PNPM: a `pnpm-workspace.yaml` with a non-empty `packages:` list
//! 4. Workspaces field: `package.json` with `workspaces`, or `"private": true`
//!    next to a lockfile. Yarn when `yarn.lock` is present, npm otherwise.
//! 5. Cargo: `Cargo.toml` with a `[workspace]` table
//! 6. Poetry: `pyproject.toml` with a `[tool.poetry]` table
//!
//! Files that are missing, oversized or malformed simply fail their
//! signature; detection itself never errors.
//!
//! # Examples
//!
//! ```no_run
//! use monorail_workspaces::detection::detect;
//! use std::path::Path;
//!
//! if let Some(found) = detect(Path::new("packages/ui/src"), 3, 1024 * 1024) {
//!     println!("{} workspace at {}", found.subtype, found.root.display());
//! }
//! ```

use crate::parsers::{has_table, read_manifest, read_package_manifest, read_text, read_workspace_yaml};
use crate::types::{DetectionResult, Subtype};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Lockfiles that make a `"private": true` manifest count as a workspace root.
const ROOT_LOCKFILES: [&str; 2] = ["yarn.lock", "package-lock.json"];

/// Walks upward from `start`, examining it and at most `max_depth` ancestors.
///
/// The nearest directory that satisfies any signature wins, even if a higher
/// ancestor would also match. Returns `None` when the budget or the
/// filesystem root is exhausted first.
#[must_use]
pub fn detect(start: &Path, max_depth: usize, max_manifest_size: u64) -> Option<DetectionResult> {
    let start = absolute(start);
    tracing::debug!(start = %start.display(), max_depth, "Detecting monorepo root");

    for dir in start.ancestors().take(max_depth.saturating_add(1)) {
        if let Some(subtype) = detect_at(dir, max_manifest_size) {
            tracing::debug!(root = %dir.display(), %subtype, "Detected monorepo");
            return Some(DetectionResult::new(subtype, dir));
        }
        tracing::trace!(dir = %dir.display(), "No workspace signature");
    }

    tracing::debug!(start = %start.display(), "No monorepo detected");
    None
}

/// Classifies a single directory without walking upward.
#[must_use]
pub fn detect_at(dir: &Path, max_manifest_size: u64) -> Option<Subtype> {
    if is_json_object(&dir.join(Subtype::Nx.declaration_file()), max_manifest_size) {
        return Some(Subtype::Nx);
    }
    if is_json_object(&dir.join(Subtype::Lerna.declaration_file()), max_manifest_size) {
        return Some(Subtype::Lerna);
    }
    if is_pnpm_workspace(dir, max_manifest_size) {
        return Some(Subtype::Pnpm);
    }
    if let Some(subtype) = workspaces_field(dir, max_manifest_size) {
        return Some(subtype);
    }
    if toml_has_table(&dir.join("Cargo.toml"), "workspace", max_manifest_size) {
        return Some(Subtype::Cargo);
    }
    if toml_has_table(&dir.join("pyproject.toml"), "tool.poetry", max_manifest_size) {
        return Some(Subtype::Poetry);
    }
    None
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn is_json_object(path: &Path, max_size: u64) -> bool {
    if !path.is_file() {
        return false;
    }
    match read_manifest::<Map<String, Value>>(path, max_size) {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Signature file is not a JSON object");
            false
        }
    }
}

fn is_pnpm_workspace(dir: &Path, max_size: u64) -> bool {
    let path = dir.join(Subtype::Pnpm.declaration_file());
    if !path.is_file() {
        return false;
    }
    match read_workspace_yaml(&path, max_size) {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Ignoring unusable pnpm workspace file");
            false
        }
    }
}

fn workspaces_field(dir: &Path, max_size: u64) -> Option<Subtype> {
    let path = dir.join("package.json");
    if !path.is_file() {
        return None;
    }
    let manifest = match read_package_manifest(&path, max_size) {
        Ok(manifest) => manifest,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Unreadable root manifest");
            return None;
        }
    };

    let has_lockfile = ROOT_LOCKFILES.iter().any(|lock| dir.join(lock).is_file());
    if manifest.workspaces.is_none() && !(manifest.private && has_lockfile) {
        return None;
    }

    if dir.join("yarn.lock").is_file() {
        Some(Subtype::Yarn)
    } else {
        Some(Subtype::Npm)
    }
}

fn toml_has_table(path: &Path, table: &str, max_size: u64) -> bool {
    if !path.is_file() {
        return false;
    }
    match read_text(path, max_size) {
        Ok(content) => has_table(&content, table),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Unreadable signature file");
            false
        }
    }
}
