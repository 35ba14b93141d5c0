//! Cargo workspace enumeration.

use super::{Limits, resolve_members};
use crate::parsers::{parse_workspace_members, read_cargo_manifest, read_text};
use crate::types::{GlobMatch, Package, Subtype, WorkspaceDeclaration};
use std::path::Path;

/// Enumerates `[workspace] members`, minus `exclude`.
///
/// A root manifest that is itself a package contributes the root crate.
/// Members without a readable `[package] name` are skipped.
#[must_use]
pub fn enumerate(root: &Path, limits: Limits) -> Vec<Package> {
    let manifest_path = root.join(Subtype::Cargo.declaration_file());
    let content = match read_text(&manifest_path, limits.max_manifest_size) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %manifest_path.display(), error = %e, "Unreadable workspace manifest");
            return Vec::new();
        }
    };

    let workspace = parse_workspace_members(&content);
    let declaration =
        WorkspaceDeclaration::from_patterns(&workspace.members).with_excludes(&workspace.exclude);
    tracing::debug!(
        members = ?declaration.include_patterns,
        exclude = ?declaration.exclude_patterns,
        "Resolving cargo workspace"
    );

    let manifest_file = Subtype::Cargo.manifest_file();
    let mut packages: Vec<Package> = resolve_members(root, &declaration, manifest_file, limits.glob)
        .iter()
        .filter_map(|member| crate_package(root, member, limits.max_manifest_size))
        .collect();

    if let Some(root_package) = root_crate(root, limits.max_manifest_size) {
        packages.push(root_package);
    }
    packages
}

fn crate_package(root: &Path, member: &GlobMatch, max_size: u64) -> Option<Package> {
    let manifest_path = member.absolute_path.join(Subtype::Cargo.manifest_file());
    let manifest = match read_cargo_manifest(&manifest_path, max_size) {
        Ok(manifest) => manifest,
        Err(e) => {
            tracing::warn!(path = %manifest_path.display(), error = %e, "Skipping unreadable crate manifest");
            return None;
        }
    };
    let Some(name) = manifest.name() else {
        tracing::debug!(path = %manifest_path.display(), "Member has no [package] name");
        return None;
    };
    Some(
        Package::new(name, member.absolute_path.clone(), manifest_path, Subtype::Cargo, root)
            .with_version(manifest.version()),
    )
}

fn root_crate(root: &Path, max_size: u64) -> Option<Package> {
    let manifest_path = root.join("Cargo.toml");
    let manifest = read_cargo_manifest(&manifest_path, max_size)
        .inspect_err(|e| {
            tracing::debug!(path = %manifest_path.display(), error = %e, "Root manifest not decodable");
        })
        .ok()?;
    let name = manifest.name()?;
    Some(
        Package::new(name, root.to_path_buf(), manifest_path, Subtype::Cargo, root)
            .with_version(manifest.version()),
    )
}
