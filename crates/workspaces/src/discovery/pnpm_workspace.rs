//! `pnpm-workspace.yaml` enumeration.

use super::{Limits, js_package, resolve_members};
use crate::parsers::read_workspace_yaml;
use crate::types::{Package, Subtype, WorkspaceDeclaration};
use std::path::Path;

/// Enumerates the `packages:` list, honoring `!` exclusions.
#[must_use]
pub fn enumerate(root: &Path, limits: Limits) -> Vec<Package> {
    let path = root.join(Subtype::Pnpm.declaration_file());
    let entries = match read_workspace_yaml(&path, limits.max_manifest_size) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Unusable pnpm workspace file");
            return Vec::new();
        }
    };

    let declaration = WorkspaceDeclaration::from_patterns(&entries);
    tracing::debug!(
        includes = ?declaration.include_patterns,
        excludes = ?declaration.exclude_patterns,
        "Resolving pnpm workspace"
    );
    resolve_members(root, &declaration, Subtype::Pnpm.manifest_file(), limits.glob)
        .iter()
        .filter_map(|member| js_package(root, member, Subtype::Pnpm, limits.max_manifest_size))
        .collect()
}
