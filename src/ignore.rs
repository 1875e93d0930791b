//! File and directory ignore pattern handling for layer merges.
//! Patterns come from the project's .otterignore, each layer's own
//! .otterignore, and a fixed set of critical patterns that no user
//! configuration can remove.

use std::fs;
use std::path::Path;

use log::debug;

use crate::constants::CRITICAL_PATTERNS;
use crate::error::Result;

/// Decides whether a relative path matches one ignore pattern.
///
/// Rules, applied in order: exact match; `dir/` patterns match the bare
/// directory name or anything under it; `*` wildcards (`*` alone matches
/// everything, `*.ext` matches by suffix); patterns without a path
/// separator match the final path segment anywhere in the tree; finally a
/// plain prefix match on the whole relative path.
pub fn matches_pattern(pattern: &str, path: &str) -> bool {
    if pattern == path {
        return true;
    }

    if let Some(dir) = pattern.strip_suffix('/') {
        return path == dir || path.starts_with(&format!("{dir}/"));
    }

    if pattern.contains('*') {
        return matches_wildcard(pattern, path);
    }

    if !pattern.contains('/') {
        let filename = path.rsplit('/').next().unwrap_or(path);
        if pattern == filename {
            return true;
        }
    }

    path.starts_with(pattern)
}

fn matches_wildcard(pattern: &str, path: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    // Suffix wildcards only; no arbitrary-position support
    if let Some(suffix) = pattern.strip_prefix('*') {
        if pattern.starts_with("*.") {
            return path.ends_with(suffix);
        }
    }
    false
}

/// The combined ignore set for one layer merge: project patterns, layer
/// patterns and the critical patterns, in that order. Matching is
/// existential over the set, so concatenation order never changes the
/// outcome.
#[derive(Debug)]
pub struct IgnoreSet {
    patterns: Vec<String>,
}

impl IgnoreSet {
    /// Combines project- and layer-level patterns with the critical
    /// patterns. The critical patterns are always present; nothing a user
    /// writes can remove them.
    pub fn combine(project_patterns: &[String], layer_patterns: &[String]) -> Self {
        let mut patterns: Vec<String> =
            project_patterns.iter().chain(layer_patterns.iter()).cloned().collect();
        patterns.extend(CRITICAL_PATTERNS.iter().map(|p| p.to_string()));
        Self { patterns }
    }

    /// Whether the relative path matches any pattern in the set.
    pub fn is_ignored(&self, relative_path: &str) -> bool {
        self.patterns.iter().any(|pattern| matches_pattern(pattern, relative_path))
    }
}

/// Reads an ignore file: one pattern per line, `#` comments and blank
/// lines skipped. A missing file yields an empty pattern list.
pub fn read_ignore_file(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        debug!("{} does not exist", path.display());
        return Ok(Vec::new());
    }

    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
