//! Common constants used throughout the Otter application.

/// Supported configuration file names, in discovery order
pub const CONFIG_FILES: [&str; 2] = ["Otterfile", "Envfile"];

/// Otter's ignore file name, read from the project root and from each layer
pub const IGNORE_FILE: &str = ".otterignore";

/// Otter's state directory inside the project root
pub const OTTER_DIR: &str = ".otter";

/// Layer cache directory name under [`OTTER_DIR`]
pub const CACHE_DIR: &str = "cache";

/// Staging area name under [`OTTER_DIR`] for per-layer merges
pub const STAGING_DIR: &str = "staging";

/// Prefix for tool-scoped environment variable lookups
pub const ENV_PREFIX: &str = "OTTER_";

/// Revision sentinel for layers backed by a plain local directory
pub const LOCAL_REVISION: &str = "local-dir";

/// Patterns that are always excluded from a merge, regardless of any
/// project or layer ignore file. Copying these from a layer would clobber
/// the project's version control or otter's own state.
pub const CRITICAL_PATTERNS: [&str; 6] =
    [".git", ".git/", ".otter", ".otter/", ".otterignore", ".gitignore"];
