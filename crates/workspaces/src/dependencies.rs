//! Dependency listing for enumerated packages.

use crate::parsers::{read_cargo_manifest, read_manifest, read_pyproject};
use crate::types::{Dependency, DependencyKind, Ecosystem, Package, Subtype};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsDependencies {
    #[serde(default)]
    dependencies: Map<String, Value>,
    #[serde(default)]
    dev_dependencies: Map<String, Value>,
    #[serde(default)]
    peer_dependencies: Map<String, Value>,
    #[serde(default)]
    optional_dependencies: Map<String, Value>,
}

impl JsDependencies {
    fn into_dependencies(self) -> Vec<Dependency> {
        [
            (self.dependencies, DependencyKind::Normal),
            (self.dev_dependencies, DependencyKind::Dev),
            (self.peer_dependencies, DependencyKind::Peer),
            (self.optional_dependencies, DependencyKind::Optional),
        ]
        .into_iter()
        .flat_map(|(map, kind)| {
            map.into_iter().map(move |(name, version)| Dependency {
                name,
                version: version.as_str().unwrap_or("*").to_string(),
                kind,
            })
        })
        .collect()
    }
}

/// Lists the dependencies declared in `package`'s manifest, sorted by kind then name.
///
/// The ecosystem is taken from the package's tag; JavaScript packages are
/// read from `package.json` even when their name came from an Nx
/// `project.json`. Unreadable manifests yield an empty list.
#[must_use]
pub fn get_dependencies(package: &Package, max_manifest_size: u64) -> Vec<Dependency> {
    let ecosystem = match package.ecosystem_tag.parse::<Subtype>() {
        Ok(subtype) => subtype.ecosystem(),
        Err(e) => {
            tracing::warn!(package = %package.name, error = %e, "Unknown ecosystem tag");
            return Vec::new();
        }
    };

    let mut deps = match ecosystem {
        Ecosystem::JavaScript => javascript(&package.path.join("package.json"), max_manifest_size),
        Ecosystem::Rust => {
            let path = package.path.join("Cargo.toml");
            read_cargo_manifest(&path, max_manifest_size)
                .map(|manifest| manifest.dependencies())
                .unwrap_or_else(|e| skipped(&path, &e))
        }
        Ecosystem::Python => {
            let path = package.path.join("pyproject.toml");
            read_pyproject(&path, max_manifest_size)
                .map(|project| project.dependencies())
                .unwrap_or_else(|e| skipped(&path, &e))
        }
    };

    deps.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
    tracing::debug!(package = %package.name, count = deps.len(), "Listed dependencies");
    deps
}

fn javascript(path: &Path, max_size: u64) -> Vec<Dependency> {
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "Package has no package.json");
        return Vec::new();
    }
    read_manifest::<JsDependencies>(path, max_size)
        .map(JsDependencies::into_dependencies)
        .unwrap_or_else(|e| skipped(path, &e))
}

fn skipped(path: &Path, error: &crate::Error) -> Vec<Dependency> {
    tracing::warn!(path = %path.display(), %error, "Cannot read dependencies");
    Vec::new()
}
