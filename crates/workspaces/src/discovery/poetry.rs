//! Poetry project enumeration.

use super::{Limits, scan_dirs};
use crate::parsers::read_pyproject;
use crate::types::{Package, Subtype};
use std::path::{Path, PathBuf};

/// Levels below the root searched for member projects (`*` and `*/*`).
const MEMBER_DEPTH: usize = 2;

/// Enumerates Poetry projects one or two levels below `root`.
///
/// The root project itself is not a member.
#[must_use]
pub fn enumerate(root: &Path, limits: Limits) -> Vec<Package> {
    scan_dirs(root, MEMBER_DEPTH, limits.glob.max_results)
        .into_iter()
        .filter_map(|dir| project(root, dir, limits.max_manifest_size))
        .collect()
}

fn project(root: &Path, dir: PathBuf, max_size: u64) -> Option<Package> {
    let manifest_path = dir.join(Subtype::Poetry.manifest_file());
    if !manifest_path.is_file() {
        return None;
    }
    let project = match read_pyproject(&manifest_path, max_size) {
        Ok(project) => project,
        Err(e) => {
            tracing::warn!(path = %manifest_path.display(), error = %e, "Skipping unreadable pyproject.toml");
            return None;
        }
    };
    if !project.is_poetry() {
        tracing::trace!(path = %manifest_path.display(), "Not a Poetry project");
        return None;
    }
    let Some(name) = project.name() else {
        tracing::debug!(path = %manifest_path.display(), "Poetry project has no name");
        return None;
    };
    Some(Package::new(name, dir, manifest_path, Subtype::Poetry, root).with_version(project.version()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_members_at_one_and_two_levels() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "pyproject.toml", "[tool.poetry]\nname = \"root\"\n");
        write(root, "core/pyproject.toml", "[tool.poetry]\nname = \"core\"\nversion = \"0.1.0\"\n");
        write(root, "services/api/pyproject.toml", "[tool.poetry]\nname = \"api\"\n");
        write(root, "services/api/deep/pyproject.toml", "[tool.poetry]\nname = \"too-deep\"\n");
        write(root, "plain/pyproject.toml", "[project]\nname = \"plain\"\n");
        write(root, "broken/pyproject.toml", "[tool.poetry\n");
        write(root, ".venv/lib/pyproject.toml", "[tool.poetry]\nname = \"hidden\"\n");

        let packages = enumerate(root, Limits::default());
        let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["core", "api"]);
        assert_eq!(packages[0].version.as_deref(), Some("0.1.0"));
        assert_eq!(packages[1].group.as_deref(), Some("services"));
        assert_eq!(packages[1].ecosystem_tag, "poetry");
    }
}
