//! Error handling for the Otter application.
//! Defines custom error types and results used throughout the application.

use std::io;
use thiserror::Error;

/// Custom error types for Otter operations.
///
/// Every failure the core can produce is one of these variants; the core
/// never terminates the process itself, it returns structured errors to
/// the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// A malformed Otterfile statement; always carries the 1-based line
    /// number of the offending logical line
    #[error("configuration error on line {line}: {message}")]
    ConfigError { line: usize, message: String },

    /// No configuration file could be discovered
    #[error("no configuration file found in '{dir}' (tried: {tried})")]
    ConfigNotFoundError { dir: String, tried: String },

    /// The project has no .otter directory yet
    #[error("'{project_dir}' is not initialized, run 'otter init' first")]
    NotInitializedError { project_dir: String },

    /// A malformed `key=value` layer condition
    #[error("invalid condition '{condition}': {message}")]
    ConditionError { condition: String, message: String },

    /// Layer source acquisition failed (clone, update or local path check)
    #[error("failed to acquire layer: {0}")]
    AcquisitionError(String),

    /// Filesystem failure while merging a layer into the target tree
    #[error("merge failed: {0}")]
    MergeError(String),

    /// A lifecycle hook command exited with a non-zero status
    #[error("hook execution failed: {0}")]
    HookError(String),

    /// Represents errors coming from libgit2
    #[error("git error: {0}")]
    Git2Error(#[from] git2::Error),
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// Prints the error message to stderr and exits with status code 1.
pub fn default_error_handler(err: Error) -> ! {
    eprintln!("Error: {}", err);
    std::process::exit(1);
}
