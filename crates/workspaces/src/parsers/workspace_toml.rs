//! Line-oriented reader for `[workspace]` member declarations.
//!
//! Scans for the `[workspace]` header, then for `members = [...]` and
//! `exclude = [...]` assignments (single- or multi-line) until the next
//! `[section]` header. Only quoted string entries are extracted.

use super::strip_comment;

/// Member declarations found in a `[workspace]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceMembers {
    /// Entries of `members = [...]`.
    pub members: Vec<String>,
    /// Entries of `exclude = [...]`.
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Members,
    Exclude,
}

fn section_header(line: &str) -> Option<&str> {
    let inner = line.strip_prefix('[')?;
    let inner = inner.strip_prefix('[').unwrap_or(inner);
    let end = inner.find(']')?;
    let name = inner[..end].trim();
    // Array values such as `["a", "b"],` are not headers.
    (!name.is_empty() && !name.starts_with(['"', '\'']) && !name.contains(',')).then_some(name)
}

/// Whether `content` has a `[table]` header, or a header of one of its sub-tables.
#[must_use]
pub fn has_table(content: &str, table: &str) -> bool {
    content.lines().any(|raw| {
        let line = strip_comment(raw).trim();
        section_header(line).is_some_and(|name| {
            name == table
                || name
                    .strip_prefix(table)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    })
}

/// Extracts `[workspace]` `members` and `exclude` entries.
///
/// Content without a `[workspace]` section yields empty lists rather than an
/// error: it simply is not a workspace.
#[must_use]
pub fn parse_workspace_members(content: &str) -> WorkspaceMembers {
    let mut result = WorkspaceMembers::default();
    let mut in_workspace = false;
    let mut collecting: Option<(Key, String)> = None;

    for raw in content.lines() {
        let line = strip_comment(raw).trim();

        if let Some((key, mut buffer)) = collecting.take() {
            if section_header(line).is_some() {
                tracing::debug!(?key, "Workspace array cut short by a section header");
                store(&mut result, key, &buffer);
            } else {
                buffer.push_str(line);
                buffer.push('\n');
                if array_closed(&buffer) {
                    store(&mut result, key, &buffer);
                } else {
                    collecting = Some((key, buffer));
                }
                continue;
            }
        }

        if let Some(name) = section_header(line) {
            in_workspace = name == "workspace";
            continue;
        }
        if !in_workspace {
            continue;
        }

        let Some((lhs, rhs)) = line.split_once('=') else {
            continue;
        };
        let key = match lhs.trim() {
            "members" => Key::Members,
            "exclude" => Key::Exclude,
            _ => continue,
        };
        let rhs = rhs.trim();
        if !rhs.starts_with('[') {
            continue;
        }
        let buffer = format!("{rhs}\n");
        if array_closed(&buffer) {
            store(&mut result, key, &buffer);
        } else {
            collecting = Some((key, buffer));
        }
    }

    if let Some((key, buffer)) = collecting {
        tracing::debug!(?key, "Unterminated workspace array; keeping entries read so far");
        store(&mut result, key, &buffer);
    }

    result
}

fn store(result: &mut WorkspaceMembers, key: Key, buffer: &str) {
    let entries = quoted_entries(buffer);
    match key {
        Key::Members => result.members = entries,
        Key::Exclude => result.exclude = entries,
    }
}

/// Whether the brackets outside quotes are balanced.
fn array_closed(buffer: &str) -> bool {
    let mut depth = 0_i32;
    let mut quote: Option<char> = None;
    let mut previous = ' ';
    for ch in buffer.chars() {
        match quote {
            Some(open) if ch == open && previous != '\\' => quote = None,
            Some(_) => {}
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '[' => depth += 1,
                ']' => depth -= 1,
                _ => {}
            },
        }
        previous = ch;
    }
    depth <= 0
}

fn quoted_entries(buffer: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut chars = buffer.chars();
    while let Some(ch) = chars.next() {
        if ch != '"' && ch != '\'' {
            continue;
        }
        let mut value = String::new();
        let mut escaped = false;
        for next in chars.by_ref() {
            if ch == '"' && escaped {
                value.push(next);
                escaped = false;
            } else if ch == '"' && next == '\\' {
                escaped = true;
            } else if next == ch {
                break;
            } else {
                value.push(next);
            }
        }
        if !value.trim().is_empty() {
            entries.push(value.trim().to_string());
        }
    }
    entries
}
