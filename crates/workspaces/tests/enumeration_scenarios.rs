//! End-to-end detection and enumeration over realistic repository layouts.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use monorail_workspaces::{
    Config, DependencyKind, EnumerateOptions, Navigator, Package, Subtype,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Routes warnings from skipped manifests and hit ceilings into the test output.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn relative(root: &Path, packages: &[Package]) -> Vec<String> {
    packages
        .iter()
        .map(|p| p.path.strip_prefix(root).unwrap().to_string_lossy().into_owned())
        .collect()
}

fn detect_and_enumerate(navigator: &Navigator, root: &Path) -> (Subtype, Vec<Package>) {
    let detection = navigator.detect(root).expect("workspace should be detected");
    let packages = navigator.enumerate_detected(&detection, &EnumerateOptions::default());
    (detection.subtype, packages)
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn test_npm_workspaces_scenario() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "package.json", r#"{"workspaces": ["packages/*"]}"#);
    write(root, "packages/ui/package.json", r#"{"name":"@x/ui"}"#);
    write(root, "packages/api/package.json", r#"{"name":"@x/api"}"#);

    let navigator = Navigator::default();
    let (subtype, packages) = detect_and_enumerate(&navigator, root);

    assert_eq!(subtype, Subtype::Npm);
    let mut found: Vec<_> = packages
        .iter()
        .map(|p| (p.name.as_str(), p.path.clone()))
        .collect();
    found.sort();
    assert_eq!(
        found,
        vec![
            ("@x/api", root.join("packages/api")),
            ("@x/ui", root.join("packages/ui")),
        ]
    );
    assert!(packages.iter().all(|p| p.ecosystem_tag == "npm"));
}

#[test]
fn test_pnpm_nested_exclusion_scenario() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "pnpm-workspace.yaml",
        "packages:\n  - \"packages/*\"\n  - \"!packages/*/test\"\n",
    );
    write(root, "packages/core/package.json", r#"{"name": "core"}"#);
    write(root, "packages/core/test/package.json", r#"{"name": "core-test"}"#);

    let (subtype, packages) = detect_and_enumerate(&Navigator::default(), root);

    assert_eq!(subtype, Subtype::Pnpm);
    assert_eq!(relative(root, &packages), vec!["packages/core"]);
}

#[test]
fn test_exclusion_prefix_scenario() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "package.json",
        r#"{"private": true, "workspaces": ["packages/*", "!packages/test*"]}"#,
    );
    write(root, "yarn.lock", "# yarn lockfile v1\n");
    write(root, "packages/core/package.json", r#"{"name": "core"}"#);
    write(root, "packages/test-utils/package.json", r#"{"name": "test-utils"}"#);

    let (subtype, packages) = detect_and_enumerate(&Navigator::default(), root);

    assert_eq!(subtype, Subtype::Yarn);
    let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["core"]);
}

#[test]
fn test_recursive_wildcard_scenario() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "pnpm-workspace.yaml", "packages:\n  - 'libs/**'\n");
    write(root, "libs/pkg/package.json", r#"{"name": "shallow"}"#);
    write(root, "libs/a/pkg/package.json", r#"{"name": "deep"}"#);

    let (_, packages) = detect_and_enumerate(&Navigator::default(), root);

    assert_eq!(relative(root, &packages), vec!["libs/a/pkg", "libs/pkg"]);
}

#[test]
fn test_directories_without_manifest_are_not_packages() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "package.json", r#"{"workspaces": ["packages/*"]}"#);
    write(root, "packages/real/package.json", r#"{"name": "real"}"#);
    write(root, "packages/docs/README.md", "# docs");

    let (_, packages) = detect_and_enumerate(&Navigator::default(), root);

    assert_eq!(relative(root, &packages), vec!["packages/real"]);
}

#[test]
fn test_malformed_member_is_skipped() {
    init_tracing();
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "package.json", r#"{"workspaces": ["packages/*"]}"#);
    write(root, "packages/a/package.json", r#"{"name": "a"}"#);
    write(root, "packages/b/package.json", r#"{"name": "b"}"#);
    write(root, "packages/broken/package.json", r#"{"name": "broken", "#);

    let (_, packages) = detect_and_enumerate(&Navigator::default(), root);

    let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_enumeration_is_deterministic() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "package.json", r#"{"workspaces": ["apps/*", "packages/**"]}"#);
    for rel in ["apps/web", "apps/admin", "packages/ui", "packages/tools/lint"] {
        write(root, &format!("{rel}/package.json"), &format!(r#"{{"name": "{rel}"}}"#));
    }

    let cached = Navigator::default();
    let first = detect_and_enumerate(&cached, root).1;
    let second = detect_and_enumerate(&cached, root).1;
    let fresh = detect_and_enumerate(&Navigator::default(), root).1;

    assert_eq!(first, second);
    assert_eq!(first, fresh);
    assert_eq!(first.len(), 4);
}

#[test]
fn test_cargo_fixture_workspace() {
    let root = fixture("test-workspace-cargo");
    let navigator = Navigator::default();
    let (subtype, packages) = detect_and_enumerate(&navigator, &root);

    assert_eq!(subtype, Subtype::Cargo);
    let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["lib-a", "lib-b", "cli"]);
    assert_eq!(packages[0].version.as_deref(), Some("workspace"));

    let crates_only = navigator.enumerate(
        &root,
        Subtype::Cargo,
        &EnumerateOptions {
            type_filter: Some("crates".to_string()),
            limit: None,
        },
    );
    assert_eq!(crates_only.len(), 2);

    let cli = navigator
        .get_package(&navigator.detect(&root).unwrap(), "cli")
        .unwrap();
    let deps = navigator.get_dependencies(&cli);
    assert_eq!(deps.len(), 2);
    assert_eq!(deps[0].name, "lib-a");
    assert_eq!(deps[0].version, "../../crates/lib-a");
    assert_eq!(deps[1].kind, DependencyKind::Build);
}

#[test]
fn test_nx_workspace() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "nx.json", r#"{"npmScope": "acme"}"#);
    write(root, "package.json", r#"{"workspaces": ["unused/*"]}"#);
    write(root, "apps/shop/project.json", r#"{"name": "shop"}"#);
    write(root, "libs/cart/package.json", r#"{"name": "@acme/cart"}"#);

    let (subtype, packages) = detect_and_enumerate(&Navigator::default(), root);

    assert_eq!(subtype, Subtype::Nx);
    let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["shop", "@acme/cart"]);
}

#[test]
fn test_lerna_workspace_uses_lerna_json() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "lerna.json", r#"{"packages": ["modules/*"]}"#);
    write(root, "package.json", r#"{"workspaces": ["packages/*"]}"#);
    write(root, "modules/m/package.json", r#"{"name": "m"}"#);
    write(root, "packages/p/package.json", r#"{"name": "p"}"#);

    let (subtype, packages) = detect_and_enumerate(&Navigator::default(), root);

    assert_eq!(subtype, Subtype::Lerna);
    assert_eq!(relative(root, &packages), vec!["modules/m"]);
}

#[test]
fn test_poetry_workspace() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "pyproject.toml", "[tool.poetry]\nname = \"mono\"\n");
    write(
        root,
        "services/api/pyproject.toml",
        "[tool.poetry]\nname = \"api\"\n\n[tool.poetry.dependencies]\npython = \"^3.12\"\nfastapi = \"^0.110\"\n",
    );

    let navigator = Navigator::default();
    let (subtype, packages) = detect_and_enumerate(&navigator, root);

    assert_eq!(subtype, Subtype::Poetry);
    assert_eq!(packages.len(), 1);
    let deps = navigator.get_dependencies(&packages[0]);
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].name, "fastapi");
}

#[test]
fn test_detection_from_nested_directory_with_depth() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "package.json", r#"{"workspaces": ["packages/*"]}"#);
    write(root, "packages/ui/src/components/package.json", "{}");
    let start = root.join("packages/ui/src/components");

    let navigator = Navigator::default();
    assert!(navigator.detect_with_depth(&start, 2).is_none());
    let found = navigator.detect_with_depth(&start, 4).unwrap();
    assert_eq!(found.root, root);
    assert_eq!(found.subtype, Subtype::Npm);
}

#[test]
fn test_configured_limits_apply() {
    init_tracing();
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "package.json", r#"{"workspaces": ["packages/*"]}"#);
    for i in 0..5 {
        write(root, &format!("packages/p{i}/package.json"), &format!(r#"{{"name": "p{i}"}}"#));
    }

    let config = Config::from_toml_str("[glob]\nmax-results = 3\n").unwrap();
    let packages = Navigator::new(config).enumerate(root, Subtype::Npm, &EnumerateOptions::default());
    assert_eq!(packages.len(), 3);
}
