//! Otter is a layered provisioning system for project working directories.
//! It composes reusable layers (git repositories or local directories) into
//! a target tree, driven by a declarative Otterfile, with variable
//! substitution, conditional layers and lifecycle hooks.

/// Build orchestration: sequences parsing, layer filtering and
/// per-layer acquisition/merge/hooks into one build run
pub mod builder;

/// Command-line interface module for the Otter application
pub mod cli;

/// Condition (`key=value`) parsing and evaluation for conditional layers
pub mod conditions;

/// Otterfile parsing into a build plan
/// Supports VAR, LAYER, ON_BEFORE_BUILD:, ON_AFTER_BUILD: and ON_ERROR:
pub mod config;

/// Common constants used throughout the Otter application
pub mod constants;

/// Error types and handling for the Otter application
pub mod error;

/// Lifecycle hook execution
/// Runs ordered shell command lists with stop-on-failure semantics
pub mod hooks;

/// File and directory ignore patterns
/// Processes .otterignore files and the non-overridable critical patterns
pub mod ignore;

/// One-time project scaffolding (`otter init`)
pub mod init;

/// Layer source resolution
/// Turns a layer specifier into a local path (git cache or local directory)
pub mod loader;

/// Layer file merging into the target tree, with staged apply and
/// optional per-file template rendering
pub mod merge;

/// Injected runtime context (platform, environment, working directory)
pub mod runtime;

/// Three-tier `${NAME}` variable substitution
pub mod variables;
