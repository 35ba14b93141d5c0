//! Glob expansion for workspace membership patterns.
//!
//! Patterns are split on `/` into segments. A segment is a literal directory
//! name, a single-level wildcard (`*`, `?`, `[...]`, matched with
//! [`glob::Pattern`] against one path component), or `**`, which matches zero
//! or more components. `**` is explored by trying both "advance to the next
//! segment" and "stay on this segment one level deeper" at every directory,
//! so it is not a greedy single wildcard.
//!
//! A directory is yielded only once every segment is consumed *and* it holds
//! one of the matcher's manifest files. The workspace root itself is never
//! yielded.

use crate::config::GlobConfig;
use crate::types::GlobMatch;
use glob::Pattern;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Directories never entered through a wildcard.
const IGNORED_DIRS: &[&str] = &["node_modules", ".git", "target", "dist"];

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Wildcard(Pattern),
    Recursive,
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if raw == "**" {
            return Self::Recursive;
        }
        if raw.contains(['*', '?', '[']) {
            match Pattern::new(raw) {
                Ok(pattern) => return Self::Wildcard(pattern),
                Err(e) => tracing::debug!(segment = raw, "Treating invalid glob segment literally: {e}"),
            }
        }
        Self::Literal(raw.to_string())
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Literal(literal) => literal == name,
            Self::Wildcard(pattern) => pattern.matches(name),
            Self::Recursive => true,
        }
    }
}

fn parse_segments(pattern: &str) -> Vec<Segment> {
    let mut segments: Vec<Segment> = pattern
        .trim()
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .map(Segment::parse)
        .collect();
    // `**/**` matches exactly what `**` matches.
    segments.dedup_by(|a, b| matches!((a, b), (Segment::Recursive, Segment::Recursive)));
    segments
}

fn match_segments(segments: &[Segment], parts: &[&str]) -> bool {
    match segments.split_first() {
        None => parts.is_empty(),
        Some((Segment::Recursive, rest)) => {
            (0..=parts.len()).any(|skip| match_segments(rest, &parts[skip..]))
        }
        Some((segment, rest)) => parts
            .split_first()
            .is_some_and(|(head, tail)| segment.matches(head) && match_segments(rest, tail)),
    }
}

/// Tests a root-relative path against a pattern under the expansion rules.
///
/// A leading `!` is ignored, so exclusion entries can be passed as written.
#[must_use]
pub fn matches_path(pattern: &str, relative_path: &Path) -> bool {
    let pattern = pattern.trim().trim_start_matches('!');
    let segments = parse_segments(pattern);
    let parts: Vec<String> = relative_path
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
    match_segments(&segments, &parts)
}

/// Whether `relative_path` satisfies any of `patterns`.
#[must_use]
pub fn matches_any(patterns: &[String], relative_path: &Path) -> bool {
    patterns.iter().any(|p| matches_path(p, relative_path))
}

/// Expands membership patterns into directories holding a manifest.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    manifests: Vec<String>,
    limits: GlobConfig,
}

impl PatternMatcher {
    /// A matcher accepting directories that contain any of `manifests`.
    #[must_use]
    pub fn new(manifests: &[&str], limits: GlobConfig) -> Self {
        Self {
            manifests: manifests.iter().map(|m| (*m).to_string()).collect(),
            limits,
        }
    }

    /// Whether `dir` holds one of the accepted manifests.
    #[must_use]
    pub fn has_manifest(&self, dir: &Path) -> bool {
        self.manifests.iter().any(|m| dir.join(m).is_file())
    }

    /// Expands `pattern` below `root`.
    ///
    /// Returns the matches and whether the pattern is an exclusion. Exclusions
    /// (`!`-prefixed) produce no matches; callers strip the `!` and filter
    /// with [`matches_path`].
    #[must_use]
    pub fn expand(&self, root: &Path, pattern: &str) -> (Vec<GlobMatch>, bool) {
        let pattern = pattern.trim();
        if pattern.starts_with('!') {
            return (Vec::new(), true);
        }

        let segments = parse_segments(pattern);
        let mut expansion = Expansion {
            matcher: self,
            root,
            matches: Vec::new(),
            seen: HashSet::new(),
            hit_result_limit: false,
            hit_depth_limit: false,
        };
        expansion.walk(root, &segments, 0);

        if expansion.hit_result_limit {
            tracing::warn!(
                pattern,
                limit = self.limits.max_results,
                "Glob expansion stopped at the result limit"
            );
        }
        if expansion.hit_depth_limit {
            tracing::warn!(
                pattern,
                limit = self.limits.max_depth,
                "Glob expansion stopped at the depth limit"
            );
        }

        let mut matches = expansion.matches;
        matches.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        tracing::trace!(pattern, count = matches.len(), "Expanded glob pattern");
        (matches, false)
    }
}

struct Expansion<'a> {
    matcher: &'a PatternMatcher,
    root: &'a Path,
    matches: Vec<GlobMatch>,
    seen: HashSet<PathBuf>,
    hit_result_limit: bool,
    hit_depth_limit: bool,
}

impl Expansion<'_> {
    fn full(&mut self) -> bool {
        if self.matches.len() >= self.matcher.limits.max_results {
            self.hit_result_limit = true;
            return true;
        }
        false
    }

    fn walk(&mut self, dir: &Path, segments: &[Segment], depth: usize) {
        if self.full() {
            return;
        }

        let Some((segment, rest)) = segments.split_first() else {
            self.accept(dir);
            return;
        };

        match segment {
            Segment::Literal(name) => {
                let next = dir.join(name);
                if next.is_dir() && self.can_descend(depth) {
                    self.walk(&next, rest, depth + 1);
                }
            }
            Segment::Wildcard(pattern) => {
                if !self.can_descend(depth) {
                    return;
                }
                for (name, child) in subdirectories(dir) {
                    if pattern.matches(&name) {
                        self.walk(&child, rest, depth + 1);
                    }
                }
            }
            Segment::Recursive => {
                // Zero components.
                self.walk(dir, rest, depth);
                // One more component, still inside `**`.
                if !self.can_descend(depth) {
                    return;
                }
                for (_, child) in subdirectories(dir) {
                    self.walk(&child, segments, depth + 1);
                }
            }
        }
    }

    fn can_descend(&mut self, depth: usize) -> bool {
        if depth >= self.matcher.limits.max_depth {
            self.hit_depth_limit = true;
            return false;
        }
        true
    }

    fn accept(&mut self, dir: &Path) {
        if dir == self.root || !self.matcher.has_manifest(dir) {
            return;
        }
        let relative = match dir.strip_prefix(self.root) {
            Ok(relative)
                if relative
                    .components()
                    .all(|c| matches!(c, std::path::Component::Normal(_))) =>
            {
                relative
            }
            _ => {
                tracing::debug!(path = %dir.display(), "Match escaped the workspace root");
                return;
            }
        };
        if !self.seen.insert(dir.to_path_buf()) {
            return;
        }
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.matches.push(GlobMatch {
            name,
            absolute_path: dir.to_path_buf(),
            relative_path: relative.to_path_buf(),
        });
    }
}

/// Real (non-symlink) child directories, minus ignored and hidden ones, sorted by name.
fn subdirectories(dir: &Path) -> Vec<(String, PathBuf)> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::trace!(path = %dir.display(), "Skipping unreadable directory: {e}");
            return Vec::new();
        }
    };

    let mut children: Vec<(String, PathBuf)> = entries
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            if name.starts_with('.') || IGNORED_DIRS.contains(&name.as_str()) {
                return None;
            }
            Some((name, entry.path()))
        })
        .collect();
    children.sort();
    children
}
