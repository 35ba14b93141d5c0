//! `workspaces`-field enumeration for npm, Yarn and Lerna.

use super::{Limits, js_package, resolve_members};
use crate::parsers::{read_manifest, read_package_manifest};
use crate::types::{Package, Subtype, WorkspaceDeclaration};
use serde::Deserialize;
use std::path::Path;

/// Lerna's location list when neither `lerna.json` nor `package.json` declares one.
const LERNA_DEFAULT_PACKAGES: &str = "packages/*";

#[derive(Debug, Default, Deserialize)]
struct LernaConfig {
    #[serde(default)]
    packages: Option<Vec<String>>,
}

/// Enumerates the patterns of the root `package.json` `workspaces` field.
#[must_use]
pub fn enumerate(root: &Path, subtype: Subtype, limits: Limits) -> Vec<Package> {
    let Some(patterns) = workspace_patterns(root, limits.max_manifest_size) else {
        return Vec::new();
    };
    enumerate_patterns(root, &patterns, subtype, limits)
}

/// Enumerates a Lerna repository.
///
/// Package locations come from `lerna.json` `packages`, then from the
/// `workspaces` field, then from Lerna's default of `packages/*`.
#[must_use]
pub fn enumerate_lerna(root: &Path, limits: Limits) -> Vec<Package> {
    let lerna_path = root.join(Subtype::Lerna.declaration_file());
    let declared = match read_manifest::<LernaConfig>(&lerna_path, limits.max_manifest_size) {
        Ok(config) => config.packages.filter(|p| !p.is_empty()),
        Err(e) => {
            tracing::warn!(path = %lerna_path.display(), error = %e, "Unreadable lerna.json");
            None
        }
    };

    let patterns = declared
        .or_else(|| {
            workspace_patterns(root, limits.max_manifest_size).filter(|p| !p.is_empty())
        })
        .unwrap_or_else(|| {
            tracing::debug!(root = %root.display(), "Using Lerna's default package location");
            vec![LERNA_DEFAULT_PACKAGES.to_string()]
        });

    enumerate_patterns(root, &patterns, Subtype::Lerna, limits)
}

fn workspace_patterns(root: &Path, max_size: u64) -> Option<Vec<String>> {
    let path = root.join("package.json");
    match read_package_manifest(&path, max_size) {
        Ok(manifest) => Some(manifest.workspace_patterns().to_vec()),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Unreadable root manifest");
            None
        }
    }
}

fn enumerate_patterns(
    root: &Path,
    patterns: &[String],
    subtype: Subtype,
    limits: Limits,
) -> Vec<Package> {
    let declaration = WorkspaceDeclaration::from_patterns(patterns);
    if declaration.is_empty() {
        tracing::debug!(root = %root.display(), %subtype, "No workspace patterns declared");
        return Vec::new();
    }
    resolve_members(root, &declaration, subtype.manifest_file(), limits.glob)
        .iter()
        .filter_map(|member| js_package(root, member, subtype, limits.max_manifest_size))
        .collect()
}
