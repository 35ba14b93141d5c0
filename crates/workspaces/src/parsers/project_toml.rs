//! Typed readers for member `Cargo.toml` and `pyproject.toml` files.

use super::read_text;
use crate::error::{Error, Result};
use crate::types::{Dependency, DependencyKind};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;

type DependencyTable = BTreeMap<String, toml::Value>;

/// The parts of a `Cargo.toml` used for enumeration and dependency listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CargoManifest {
    /// `[package]`; absent for virtual workspace roots.
    #[serde(default)]
    pub package: Option<CargoPackage>,
    /// `[workspace]`.
    #[serde(default)]
    pub workspace: Option<toml::Value>,
    #[serde(default)]
    dependencies: DependencyTable,
    #[serde(default, rename = "dev-dependencies")]
    dev_dependencies: DependencyTable,
    #[serde(default, rename = "build-dependencies")]
    build_dependencies: DependencyTable,
}

/// `[package]` of a `Cargo.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CargoPackage {
    /// Crate name.
    #[serde(default)]
    pub name: Option<String>,
    /// A version string, or `{ workspace = true }`.
    #[serde(default)]
    pub version: Option<toml::Value>,
}

impl CargoManifest {
    /// The declared crate name, if non-empty.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.package
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }

    /// The version string; inherited versions read as `workspace`.
    #[must_use]
    pub fn version(&self) -> Option<String> {
        match self.package.as_ref()?.version.as_ref()? {
            toml::Value::String(version) => Some(version.clone()),
            toml::Value::Table(table) if is_workspace_inherited(table) => {
                Some("workspace".to_string())
            }
            _ => None,
        }
    }

    /// Declared dependencies, sorted by kind then name.
    #[must_use]
    pub fn dependencies(&self) -> Vec<Dependency> {
        let mut deps = Vec::new();
        collect(&mut deps, &self.dependencies, DependencyKind::Normal, cargo_requirement);
        collect(&mut deps, &self.dev_dependencies, DependencyKind::Dev, cargo_requirement);
        collect(&mut deps, &self.build_dependencies, DependencyKind::Build, cargo_requirement);
        deps.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
        deps
    }
}

/// The parts of a `pyproject.toml` used for enumeration and dependency listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PyProject {
    #[serde(default)]
    tool: Option<PyTools>,
    #[serde(default)]
    project: Option<PyProjectTable>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PyTools {
    #[serde(default)]
    poetry: Option<PoetrySection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PyProjectTable {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PoetrySection {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dependencies: DependencyTable,
    #[serde(default, rename = "dev-dependencies")]
    dev_dependencies: DependencyTable,
    #[serde(default)]
    group: BTreeMap<String, PoetryGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PoetryGroup {
    #[serde(default)]
    dependencies: DependencyTable,
}

impl PyProject {
    /// Whether a `[tool.poetry]` table is present.
    #[must_use]
    pub fn is_poetry(&self) -> bool {
        self.poetry().is_some()
    }

    fn poetry(&self) -> Option<&PoetrySection> {
        self.tool.as_ref().and_then(|t| t.poetry.as_ref())
    }

    /// `[tool.poetry] name`, falling back to `[project] name`.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.poetry()
            .and_then(|p| p.name.as_deref())
            .or_else(|| self.project.as_ref().and_then(|p| p.name.as_deref()))
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }

    /// `[tool.poetry] version`, falling back to `[project] version`.
    #[must_use]
    pub fn version(&self) -> Option<String> {
        self.poetry()
            .and_then(|p| p.version.clone())
            .or_else(|| self.project.as_ref().and_then(|p| p.version.clone()))
    }

    /// Poetry dependencies without the interpreter constraint, sorted by kind then name.
    ///
    /// `dev-dependencies` and every `group.<name>.dependencies` table count as
    /// development dependencies.
    #[must_use]
    pub fn dependencies(&self) -> Vec<Dependency> {
        let Some(poetry) = self.poetry() else {
            return Vec::new();
        };
        let mut deps = Vec::new();
        collect(&mut deps, &poetry.dependencies, DependencyKind::Normal, poetry_requirement);
        collect(&mut deps, &poetry.dev_dependencies, DependencyKind::Dev, poetry_requirement);
        for group in poetry.group.values() {
            collect(&mut deps, &group.dependencies, DependencyKind::Dev, poetry_requirement);
        }
        deps.retain(|d| !d.name.eq_ignore_ascii_case("python"));
        deps.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
        deps.dedup_by(|a, b| a.kind == b.kind && a.name == b.name);
        deps
    }
}

/// Parses TOML `content` read from `path`.
///
/// # Errors
///
/// Returns [`Error::Toml`] when the content is not valid TOML of the expected shape.
pub fn parse_toml<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T> {
    toml::from_str(content).map_err(|source| Error::Toml {
        source,
        path: Some(path.to_path_buf()),
    })
}

/// Reads a `Cargo.toml` no larger than `max_size` bytes.
///
/// # Errors
///
/// Returns an error if the file is missing, oversized, or malformed.
pub fn read_cargo_manifest(path: &Path, max_size: u64) -> Result<CargoManifest> {
    let content = read_text(path, max_size)?;
    parse_toml(path, &content)
}

/// Reads a `pyproject.toml` no larger than `max_size` bytes.
///
/// # Errors
///
/// Returns an error if the file is missing, oversized, or malformed.
pub fn read_pyproject(path: &Path, max_size: u64) -> Result<PyProject> {
    let content = read_text(path, max_size)?;
    parse_toml(path, &content)
}

fn is_workspace_inherited(table: &toml::Table) -> bool {
    table
        .get("workspace")
        .and_then(toml::Value::as_bool)
        .unwrap_or(false)
}

fn collect(
    out: &mut Vec<Dependency>,
    table: &DependencyTable,
    kind: DependencyKind,
    requirement: fn(&toml::Value) -> String,
) {
    out.extend(table.iter().map(|(name, value)| Dependency {
        name: name.clone(),
        version: requirement(value),
        kind,
    }));
}

fn cargo_requirement(value: &toml::Value) -> String {
    match value {
        toml::Value::String(version) => version.clone(),
        toml::Value::Table(table) => {
            if let Some(version) = table.get("version").and_then(toml::Value::as_str) {
                version.to_string()
            } else if is_workspace_inherited(table) {
                "workspace".to_string()
            } else if let Some(path) = table.get("path").and_then(toml::Value::as_str) {
                path.to_string()
            } else {
                "*".to_string()
            }
        }
        _ => "*".to_string(),
    }
}

fn poetry_requirement(value: &toml::Value) -> String {
    match value {
        toml::Value::String(version) => version.clone(),
        toml::Value::Table(table) => table
            .get("version")
            .or_else(|| table.get("path"))
            .or_else(|| table.get("git"))
            .and_then(toml::Value::as_str)
            .unwrap_or("*")
            .to_string(),
        _ => "*".to_string(),
    }
}
