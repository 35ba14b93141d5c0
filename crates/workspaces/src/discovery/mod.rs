//! Package enumeration for each workspace convention.
//!
//! [`enumerate`] is the single dispatch point: it selects the strategy for a
//! [`Subtype`], then deduplicates and sorts what the strategy produced.
//! Strategies never fail. A malformed member manifest is logged and skipped,
//! and an unreadable workspace file yields an empty list.
//!
//! - [`package_json`]: npm and Yarn `workspaces` fields, and Lerna
//! - [`pnpm_workspace`]: `pnpm-workspace.yaml`
//! - [`cargo_toml`]: `[workspace] members`/`exclude`
//! - [`nx`]: project directories under `apps/`, `libs/` and `packages/`
//! - [`poetry`]: `pyproject.toml` projects one or two levels below the root
//!
//! # Usage
//!
//! ```rust,no_run
//! use monorail_workspaces::discovery::{Limits, enumerate};
//! use monorail_workspaces::{Config, Subtype};
//! use std::path::Path;
//!
//! let limits = Limits::from_config(&Config::default());
//! for package in enumerate(Path::new("/repo"), Subtype::Pnpm, limits) {
//!     println!("{} -> {}", package.name, package.path.display());
//! }
//! ```

pub mod cargo_toml;
pub mod nx;
pub mod package_json;
pub mod pnpm_workspace;
pub mod poetry;

use crate::config::{Config, GlobConfig};
use crate::parsers::read_package_manifest;
use crate::pattern::{PatternMatcher, matches_any};
use crate::types::{GlobMatch, Package, Subtype, WorkspaceDeclaration};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const PRUNED_DIRS: [&str; 4] = ["node_modules", ".git", "target", "dist"];

/// Ceilings applied while enumerating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Glob expansion ceilings.
    pub glob: GlobConfig,
    /// Largest manifest, in bytes, that will be read.
    pub max_manifest_size: u64,
}

impl Limits {
    /// Takes the glob and manifest ceilings from `config`.
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self {
            glob: config.glob,
            max_manifest_size: config.manifest.max_size,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Lists the member packages of the `subtype` workspace rooted at `root`.
///
/// The result is sorted by path and holds at most one package per path.
#[must_use]
pub fn enumerate(root: &Path, subtype: Subtype, limits: Limits) -> Vec<Package> {
    if !root.is_dir() {
        tracing::warn!(root = %root.display(), %subtype, "Workspace root is not a readable directory");
        return Vec::new();
    }

    let mut packages = match subtype {
        Subtype::Npm | Subtype::Yarn => package_json::enumerate(root, subtype, limits),
        Subtype::Lerna => package_json::enumerate_lerna(root, limits),
        Subtype::Pnpm => pnpm_workspace::enumerate(root, limits),
        Subtype::Nx => nx::enumerate(root, limits),
        Subtype::Cargo => cargo_toml::enumerate(root, limits),
        Subtype::Poetry => poetry::enumerate(root, limits),
    };

    packages.sort_by(|a, b| a.path.cmp(&b.path));
    packages.dedup_by(|a, b| a.path == b.path);

    tracing::debug!(
        root = %root.display(),
        %subtype,
        count = packages.len(),
        "Enumerated workspace packages"
    );
    packages
}

/// Expands every include pattern, deduplicates by absolute path, then drops
/// matches whose root-relative path satisfies an exclude pattern.
pub(crate) fn resolve_members(
    root: &Path,
    declaration: &WorkspaceDeclaration,
    manifest_file: &str,
    glob: GlobConfig,
) -> Vec<GlobMatch> {
    let matcher = PatternMatcher::new(&[manifest_file], glob);
    let mut seen = HashSet::new();
    let mut members = Vec::new();

    for pattern in &declaration.include_patterns {
        let (matches, _) = matcher.expand(root, pattern);
        for found in matches {
            if seen.insert(found.absolute_path.clone()) {
                members.push(found);
            }
        }
    }

    members.retain(|member| {
        let excluded = matches_any(&declaration.exclude_patterns, &member.relative_path);
        if excluded {
            tracing::debug!(path = %member.relative_path.display(), "Member excluded");
        }
        !excluded
    });
    members
}

/// Directories between one and `max_depth` levels below `base`, sorted.
///
/// Symlinks are not followed, and hidden, `node_modules`, `.git`, `target`
/// and `dist` directories are pruned. At most `max_results` paths are returned.
pub(crate) fn scan_dirs(base: &Path, max_depth: usize, max_results: usize) -> Vec<PathBuf> {
    let walker = WalkDir::new(base)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name();

    let mut dirs = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_str().unwrap_or("");
            !(name.starts_with('.') || PRUNED_DIRS.contains(&name))
        })
        .filter_map(std::result::Result::ok)
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        if dirs.len() >= max_results {
            tracing::warn!(base = %base.display(), limit = max_results, "Directory scan stopped at the result limit");
            break;
        }
        dirs.push(entry.into_path());
    }
    dirs
}

/// Builds a package from a member's `package.json`.
///
/// The declared name wins; a manifest without one is named after its
/// directory. Unreadable manifests are skipped with a warning.
pub(crate) fn js_package(
    root: &Path,
    member: &GlobMatch,
    subtype: Subtype,
    max_size: u64,
) -> Option<Package> {
    let manifest_path = member.absolute_path.join(subtype.manifest_file());
    let manifest = match read_package_manifest(&manifest_path, max_size) {
        Ok(manifest) => manifest,
        Err(e) => {
            tracing::warn!(path = %manifest_path.display(), error = %e, "Skipping package with unreadable manifest");
            return None;
        }
    };
    let name = manifest
        .declared_name()
        .map_or_else(|| member.name.clone(), str::to_string);
    Some(
        Package::new(name, member.absolute_path.clone(), manifest_path, subtype, root)
            .with_version(manifest.version),
    )
}
