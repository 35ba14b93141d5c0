//! Monorepo detection and package enumeration.
//!
//! This crate classifies a directory tree against the workspace conventions
//! of several ecosystems and lists the member packages they declare:
//!
//! | Subtype | Declared by | Members |
//! |---|---|---|
//! | `npm-workspaces`, `yarn-workspaces` | `package.json` `workspaces` | glob patterns, `!` excludes |
//! | `nx` | `nx.json` | `apps/*`, `libs/*`, `packages/*` |
//! | `lerna` | `lerna.json` | `packages`, else `workspaces`, else `packages/*` |
//! | `pnpm-workspaces` | `pnpm-workspace.yaml` | `packages:` list, `!` excludes |
//! | `cargo-workspace` | `Cargo.toml` `[workspace]` | `members` minus `exclude` |
//! | `poetry` | `pyproject.toml` `[tool.poetry]` | projects at `*` and `*/*` |
//!
//! # Architecture
//!
//! - [`pattern`]: glob expansion of membership patterns into directories that
//!   hold a manifest, bounded by result and depth ceilings
//! - [`parsers`]: narrow readers for JSON manifests, the `packages:` list of
//!   a workspace YAML file, and `[workspace]` member declarations
//! - [`detection`]: upward walk testing each convention's signature in a
//!   fixed order
//! - [`discovery`]: one enumerator per [`Subtype`], selected by a single match
//! - [`Navigator`]: caches detection and enumeration in a
//!   [`monorail_cache::Cache`]
//!
//! # Failure model
//!
//! Not finding a monorepo or a package is an empty result, not an error. A
//! malformed or oversized member manifest is logged and skipped, so one bad
//! package never hides the others.
//!
//! # Example
//!
//! ```no_run
//! use monorail_workspaces::{Config, EnumerateOptions, Navigator};
//! use std::path::Path;
//!
//! let navigator = Navigator::new(Config::default());
//! if let Some(detection) = navigator.detect(Path::new(".")) {
//!     let packages = navigator.enumerate_detected(&detection, &EnumerateOptions::default());
//!     for package in &packages {
//!         println!("{} ({})", package.name, package.path.display());
//!     }
//! }
//! ```

pub mod config;
pub mod dependencies;
pub mod detection;
pub mod discovery;
pub mod error;
pub mod navigator;
pub mod parsers;
pub mod pattern;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use navigator::{DETECTION_NAMESPACE, Navigator, PACKAGES_NAMESPACE};
pub use pattern::{PatternMatcher, matches_path};
pub use types::{
    Dependency, DependencyKind, DetectionResult, Ecosystem, EnumerateOptions, GlobMatch, Package,
    Subtype, WorkspaceDeclaration,
};
