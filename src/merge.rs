//! Layer file merging.
//!
//! Walks a resolved layer's tree, applies the combined ignore set and
//! optional per-file template rendering, and writes results into the
//! target tree. Files are first written to a staging directory under
//! `.otter/staging` and promoted into the live target only once the whole
//! layer merged cleanly, so a mid-merge failure never leaves a
//! half-applied target.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use indexmap::IndexMap;
use log::debug;
use regex::{Captures, Regex};
use walkdir::WalkDir;

use crate::constants::{IGNORE_FILE, OTTER_DIR, STAGING_DIR};
use crate::error::{Error, Result};
use crate::ignore::{read_ignore_file, IgnoreSet};

fn merge_error(message: impl Into<String>) -> Error {
    Error::MergeError(message.into())
}

/// Copies every non-ignored entry of `layer_path` into `target_dir`.
///
/// The ignore set is the union of the given project patterns, the layer's
/// own ignore file and the critical patterns. Files are rendered as
/// templates only when `template_vars` is non-empty and the content
/// carries `{{ }}` markup; otherwise they are copied byte-for-byte.
/// Existing destination files are silently overwritten.
pub fn merge_layer(
    layer_path: &Path,
    target_dir: &Path,
    project_root: &Path,
    template_vars: &IndexMap<String, String>,
    project_patterns: &[String],
) -> Result<()> {
    let layer_patterns = read_ignore_file(&layer_path.join(IGNORE_FILE))?;
    let ignore = IgnoreSet::combine(project_patterns, &layer_patterns);

    let staging_base = project_root.join(OTTER_DIR).join(STAGING_DIR);
    fs::create_dir_all(&staging_base)
        .map_err(|e| merge_error(format!("failed to create staging area: {e}")))?;
    let staging = tempfile::Builder::new()
        .prefix("layer-")
        .tempdir_in(&staging_base)
        .map_err(|e| merge_error(format!("failed to create staging directory: {e}")))?;

    stage_layer(layer_path, staging.path(), &ignore, template_vars)?;
    promote_staged(staging.path(), target_dir)
}

/// Walks the layer and writes the filtered, rendered tree into staging.
fn stage_layer(
    layer_path: &Path,
    staging: &Path,
    ignore: &IgnoreSet,
    template_vars: &IndexMap<String, String>,
) -> Result<()> {
    let mut walker = WalkDir::new(layer_path).into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|e| merge_error(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(layer_path)
            .map_err(|e| merge_error(e.to_string()))?;
        if relative.as_os_str().is_empty() {
            continue;
        }
        let relative_str = relative
            .to_str()
            .ok_or_else(|| merge_error(format!("non UTF-8 path in layer: {relative:?}")))?;

        if ignore.is_ignored(relative_str) {
            println!("  Ignoring: {relative_str}");
            if entry.file_type().is_dir() {
                // Never descend into an ignored directory
                walker.skip_current_dir();
            }
            continue;
        }

        let staged = staging.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&staged)
                .map_err(|e| merge_error(format!("failed to create {}: {e}", staged.display())))?;
        } else {
            stage_file(entry.path(), &staged, template_vars)?;
        }
    }

    Ok(())
}

/// Writes one staged file, rendering it as a template when applicable,
/// and mirrors the source file's permissions.
fn stage_file(
    source: &Path,
    staged: &Path,
    template_vars: &IndexMap<String, String>,
) -> Result<()> {
    if let Some(parent) = staged.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| merge_error(format!("failed to create {}: {e}", parent.display())))?;
    }

    let bytes = fs::read(source)
        .map_err(|e| merge_error(format!("failed to read {}: {e}", source.display())))?;

    let rendered = if template_vars.is_empty() {
        None
    } else {
        match std::str::from_utf8(&bytes) {
            Ok(text) if contains_template_syntax(text) => {
                debug!("Rendering template: {}", source.display());
                Some(render_template(text, template_vars))
            }
            _ => None,
        }
    };

    match rendered {
        Some(content) => fs::write(staged, content),
        None => fs::write(staged, &bytes),
    }
    .map_err(|e| merge_error(format!("failed to write {}: {e}", staged.display())))?;

    let permissions = fs::metadata(source)
        .map_err(|e| merge_error(format!("failed to stat {}: {e}", source.display())))?
        .permissions();
    fs::set_permissions(staged, permissions)
        .map_err(|e| merge_error(format!("failed to set permissions on {}: {e}", staged.display())))?;

    Ok(())
}

/// Moves the fully staged tree into the live target, reporting each file
/// as created or overwritten.
fn promote_staged(staging: &Path, target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)
        .map_err(|e| merge_error(format!("failed to create {}: {e}", target_dir.display())))?;

    for entry in WalkDir::new(staging) {
        let entry = entry.map_err(|e| merge_error(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(staging)
            .map_err(|e| merge_error(e.to_string()))?;
        if relative.as_os_str().is_empty() {
            continue;
        }

        let dest = target_dir.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)
                .map_err(|e| merge_error(format!("failed to create {}: {e}", dest.display())))?;
            continue;
        }

        if dest.exists() {
            println!("  Overwriting: {}", dest.display());
        } else {
            println!("  Creating: {}", dest.display());
        }

        // Staging lives inside the project, so a rename normally
        // suffices; fall back to a copy across filesystems
        if fs::rename(entry.path(), &dest).is_err() {
            fs::copy(entry.path(), &dest)
                .map_err(|e| merge_error(format!("failed to write {}: {e}", dest.display())))?;
        }
    }

    Ok(())
}

fn template_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*\.?([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap())
}

/// Whether content carries template markup worth rendering.
pub fn contains_template_syntax(content: &str) -> bool {
    content.contains("{{") && content.contains("}}")
}

/// Renders `{{ name }}` references against the supplied variables.
/// References with no matching variable are left as literal text.
pub fn render_template(content: &str, template_vars: &IndexMap<String, String>) -> String {
    template_re()
        .replace_all(content, |caps: &Captures| match template_vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
