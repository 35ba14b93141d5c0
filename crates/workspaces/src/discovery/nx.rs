//! Nx project enumeration.
//!
//! Nx does not declare members; projects are the immediate subdirectories of
//! the conventional `apps/`, `libs/` and `packages/` folders that hold a
//! `project.json` or `package.json`.

use super::{Limits, scan_dirs};
use crate::parsers::{PackageManifest, read_manifest};
use crate::types::{Package, Subtype};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Folders scanned for projects, one level deep.
pub const PROJECT_DIRS: [&str; 3] = ["apps", "libs", "packages"];

#[derive(Debug, Default, Deserialize)]
struct ProjectConfig {
    #[serde(default)]
    name: Option<String>,
}

/// Enumerates projects under [`PROJECT_DIRS`].
#[must_use]
pub fn enumerate(root: &Path, limits: Limits) -> Vec<Package> {
    PROJECT_DIRS
        .iter()
        .map(|dir| root.join(dir))
        .filter(|dir| dir.is_dir())
        .flat_map(|dir| scan_dirs(&dir, 1, limits.glob.max_results))
        .filter_map(|dir| project(root, dir, limits.max_manifest_size))
        .collect()
}

fn project(root: &Path, dir: PathBuf, max_size: u64) -> Option<Package> {
    let project_json = dir.join("project.json");
    let package_json = dir.join("package.json");
    let has_project = project_json.is_file();
    let has_package = package_json.is_file();
    if !has_project && !has_package {
        return None;
    }

    let project_name = has_project
        .then(|| read_manifest::<ProjectConfig>(&project_json, max_size))
        .and_then(|result| {
            result
                .inspect_err(|e| {
                    tracing::warn!(path = %project_json.display(), error = %e, "Unreadable project.json");
                })
                .ok()
        })
        .map(|config| config.name);

    let package = has_package
        .then(|| read_manifest::<PackageManifest>(&package_json, max_size))
        .and_then(|result| {
            result
                .inspect_err(|e| {
                    tracing::warn!(path = %package_json.display(), error = %e, "Unreadable package.json");
                })
                .ok()
        });

    if project_name.is_none() && package.is_none() {
        tracing::warn!(path = %dir.display(), "Skipping project without a readable manifest");
        return None;
    }

    let declared_project = project_name
        .flatten()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let declared_package = package
        .as_ref()
        .and_then(|m| m.declared_name().map(str::to_string));
    let version = package.as_ref().and_then(|m| m.version.clone());

    let (name, manifest_path) = if let Some(name) = declared_project {
        (name, project_json)
    } else if let Some(name) = declared_package {
        (name, package_json)
    } else {
        let name = dir.file_name()?.to_string_lossy().into_owned();
        (name, if has_project { project_json } else { package_json })
    };

    Some(Package::new(name, dir, manifest_path, Subtype::Nx, root).with_version(version))
}
