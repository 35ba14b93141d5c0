//! Value types shared by detection, enumeration and the navigator.
//!
//! Everything here is a read-only snapshot: nothing mutates a [`Package`] or
//! [`DetectionResult`] after construction, and the cache hands out copies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Language family of a monorepo convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// Node package managers and task runners.
    JavaScript,
    /// Cargo workspaces.
    Rust,
    /// Poetry projects.
    Python,
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JavaScript => write!(f, "javascript"),
            Self::Rust => write!(f, "rust"),
            Self::Python => write!(f, "python"),
        }
    }
}

/// The specific workspace-declaration convention, used to pick an enumerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Subtype {
    /// `workspaces` field in `package.json`, no Yarn lockfile.
    Npm,
    /// `workspaces` field in `package.json` with `yarn.lock`.
    Yarn,
    /// `nx.json` at the root.
    Nx,
    /// `lerna.json` at the root.
    Lerna,
    /// `pnpm-workspace.yaml` at the root.
    Pnpm,
    /// `[workspace]` table in `Cargo.toml`.
    Cargo,
    /// `[tool.poetry]` table in `pyproject.toml`.
    Poetry,
}

impl Subtype {
    /// All subtypes.
    pub const ALL: [Self; 7] = [
        Self::Nx,
        Self::Lerna,
        Self::Pnpm,
        Self::Yarn,
        Self::Npm,
        Self::Cargo,
        Self::Poetry,
    ];

    /// The family this convention belongs to.
    #[must_use]
    pub const fn ecosystem(self) -> Ecosystem {
        match self {
            Self::Npm | Self::Yarn | Self::Nx | Self::Lerna | Self::Pnpm => Ecosystem::JavaScript,
            Self::Cargo => Ecosystem::Rust,
            Self::Poetry => Ecosystem::Python,
        }
    }

    /// Stable long name, e.g. `pnpm-workspaces`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Npm => "npm-workspaces",
            Self::Yarn => "yarn-workspaces",
            Self::Nx => "nx",
            Self::Lerna => "lerna",
            Self::Pnpm => "pnpm-workspaces",
            Self::Cargo => "cargo-workspace",
            Self::Poetry => "poetry",
        }
    }

    /// Short tag stamped on every [`Package`] this convention produces.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Nx => "nx",
            Self::Lerna => "lerna",
            Self::Pnpm => "pnpm",
            Self::Cargo => "cargo",
            Self::Poetry => "poetry",
        }
    }

    /// Root file that declares the workspace; editing it invalidates cached enumerations.
    #[must_use]
    pub const fn declaration_file(self) -> &'static str {
        match self {
            Self::Npm | Self::Yarn => "package.json",
            Self::Nx => "nx.json",
            Self::Lerna => "lerna.json",
            Self::Pnpm => "pnpm-workspace.yaml",
            Self::Cargo => "Cargo.toml",
            Self::Poetry => "pyproject.toml",
        }
    }

    /// Per-package manifest file name.
    #[must_use]
    pub const fn manifest_file(self) -> &'static str {
        match self {
            Self::Npm | Self::Yarn | Self::Nx | Self::Lerna | Self::Pnpm => "package.json",
            Self::Cargo => "Cargo.toml",
            Self::Poetry => "pyproject.toml",
        }
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subtype {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|subtype| subtype.as_str() == trimmed || subtype.tag() == trimmed)
            .ok_or_else(|| crate::Error::config(format!("unknown workspace subtype '{trimmed}'")))
    }
}

/// Which convention governs a monorepo, and where its root is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Language family.
    pub ecosystem: Ecosystem,
    /// Workspace convention; selects the enumerator.
    pub subtype: Subtype,
    /// Monorepo root directory.
    pub root: PathBuf,
}

impl DetectionResult {
    /// Creates a result for `root` under `subtype`.
    #[must_use]
    pub fn new(subtype: Subtype, root: impl Into<PathBuf>) -> Self {
        Self {
            ecosystem: subtype.ecosystem(),
            subtype,
            root: root.into(),
        }
    }

    /// The root file whose changes invalidate enumeration of this workspace.
    #[must_use]
    pub fn declaration_path(&self) -> PathBuf {
        self.root.join(self.subtype.declaration_file())
    }
}

/// A member package of a monorepo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Package {
    /// Ecosystem-declared identifier, e.g. an npm package or crate name.
    pub name: String,
    /// Package root directory.
    pub path: PathBuf,
    /// The manifest the name was read from.
    pub manifest_path: PathBuf,
    /// Tag of the convention that produced this package, see [`Subtype::tag`].
    pub ecosystem_tag: String,
    /// Declared version, when the manifest has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// First root-relative path segment, e.g. `apps` or `packages`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl Package {
    pub(crate) fn new(
        name: impl Into<String>,
        path: PathBuf,
        manifest_path: PathBuf,
        subtype: Subtype,
        root: &Path,
    ) -> Self {
        let group = path
            .strip_prefix(root)
            .ok()
            .and_then(|rel| rel.components().next())
            .map(|c| c.as_os_str().to_string_lossy().into_owned());
        Self {
            name: name.into(),
            path,
            manifest_path,
            ecosystem_tag: subtype.tag().to_string(),
            version: None,
            group,
        }
    }

    #[must_use]
    pub(crate) fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }
}

/// A directory produced by glob expansion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobMatch {
    /// Final path component.
    pub name: String,
    /// Absolute directory path.
    pub absolute_path: PathBuf,
    /// Path relative to the workspace root; exclusions are tested against this.
    pub relative_path: PathBuf,
}

/// Membership patterns read from a workspace file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceDeclaration {
    /// Patterns that produce packages.
    pub include_patterns: Vec<String>,
    /// Patterns, stripped of their `!`, that veto packages.
    pub exclude_patterns: Vec<String>,
}

impl WorkspaceDeclaration {
    /// Splits raw entries into includes and `!`-prefixed excludes.
    #[must_use]
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut declaration = Self::default();
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }
            match pattern.strip_prefix('!') {
                Some(excluded) => declaration.exclude_patterns.push(excluded.to_string()),
                None => declaration.include_patterns.push(pattern.to_string()),
            }
        }
        declaration
    }

    /// Adds patterns that were declared as exclusions without a `!` prefix.
    #[must_use]
    pub fn with_excludes<I, S>(mut self, excludes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude_patterns.extend(
            excludes
                .into_iter()
                .map(|e| e.as_ref().trim().trim_start_matches('!').to_string())
                .filter(|e| !e.is_empty()),
        );
        self
    }

    /// Whether no include patterns were declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.include_patterns.is_empty()
    }
}

/// How a dependency is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// Runtime dependency.
    Normal,
    /// Development-only dependency.
    Dev,
    /// Peer dependency.
    Peer,
    /// Optional dependency.
    Optional,
    /// Build-script dependency.
    Build,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Normal => "normal",
            Self::Dev => "dev",
            Self::Peer => "peer",
            Self::Optional => "optional",
            Self::Build => "build",
        };
        f.write_str(s)
    }
}

/// A dependency declared in a package manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    /// Dependency name.
    pub name: String,
    /// Version requirement as written (or a path/`workspace` marker).
    pub version: String,
    /// Declaration section.
    pub kind: DependencyKind,
}

/// Post-processing applied to an enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumerateOptions {
    /// Keep only packages whose [`Package::group`] equals this.
    pub type_filter: Option<String>,
    /// Keep at most this many packages.
    pub limit: Option<usize>,
}

impl EnumerateOptions {
    /// Applies the filter then the limit.
    #[must_use]
    pub fn apply(&self, packages: Vec<Package>) -> Vec<Package> {
        let filtered = packages.into_iter().filter(|package| {
            self.type_filter
                .as_deref()
                .is_none_or(|wanted| package.group.as_deref() == Some(wanted))
        });
        match self.limit {
            Some(limit) => filtered.take(limit).collect(),
            None => filtered.collect(),
        }
    }
}
