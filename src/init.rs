//! One-time project scaffolding for `otter init`.
//! Creates the .otter state directory (including the layer cache the
//! build requires), a default .otterignore and a sample Otterfile.

use std::fs;
use std::path::Path;

use crate::constants::{CACHE_DIR, IGNORE_FILE, OTTER_DIR};
use crate::error::Result;

const DEFAULT_IGNORE: &str = "\
# Otter ignore file - specify files and patterns to ignore when merging layers
.git/
.otter/
node_modules/
*.log
*.tmp
.DS_Store
";

const SAMPLE_OTTERFILE: &str = "\
# Otterfile - define layers to pull from git repositories
# Syntax: LAYER <git-repo-url> [TARGET <path>] [IF <key>=<value>] [TEMPLATE <k=v> ...]
# Example:
# LAYER git@github.com:otter-layers/go-cobra-cli.git
# LAYER git@github.com:otter-layers/cursor-go-rules.git TARGET .cursor/rules
";

/// Initializes `project_root` for otter. Existing files are left alone.
pub fn run(project_root: &Path) -> Result<()> {
    let otter_dir = project_root.join(OTTER_DIR);
    let cache_dir = otter_dir.join(CACHE_DIR);
    fs::create_dir_all(&cache_dir)?;

    let ignore_path = project_root.join(IGNORE_FILE);
    if !ignore_path.exists() {
        fs::write(&ignore_path, DEFAULT_IGNORE)?;
        println!("Created {IGNORE_FILE} file");
    }

    let otterfile_path = project_root.join("Otterfile");
    if !otterfile_path.exists() {
        fs::write(&otterfile_path, SAMPLE_OTTERFILE)?;
        println!("Created sample Otterfile");
    }

    println!("Otter initialized successfully in {}", project_root.display());
    println!("Created directories:");
    println!("  {}", otter_dir.display());
    println!("  {}", cache_dir.display());

    Ok(())
}
