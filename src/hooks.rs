//! Lifecycle hook execution.
//! Hooks are ordered lists of shell command strings run in a fixed
//! working directory, streaming their output live. The first non-zero
//! exit stops the list and fails the phase.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use log::warn;

use crate::error::{Error, Result};

/// Runs hook command lists through the platform shell.
pub struct CommandExecutor {
    work_dir: PathBuf,
}

impl CommandExecutor {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self { work_dir: work_dir.into() }
    }

    /// Executes the commands in order, stopping at the first failure.
    /// An empty list is a no-op success.
    pub fn run_all(&self, commands: &[String], phase: &str) -> Result<()> {
        if commands.is_empty() {
            return Ok(());
        }

        println!("  Executing {phase} commands:");
        for (i, command) in commands.iter().enumerate() {
            println!("    [{}/{}] {}", i + 1, commands.len(), command);
            self.run(command).map_err(|e| match e {
                Error::HookError(message) => Error::HookError(format!(
                    "failed to execute {phase} command '{command}': {message}"
                )),
                other => other,
            })?;
        }

        Ok(())
    }

    /// Executes the primary commands; if they fail, runs the cleanup
    /// commands on a best-effort basis. Cleanup failures are logged and
    /// never mask the primary error.
    pub fn run_all_with_cleanup(
        &self,
        commands: &[String],
        phase: &str,
        cleanup: &[String],
    ) -> Result<()> {
        let result = self.run_all(commands, phase);
        if result.is_err() && !cleanup.is_empty() {
            println!("  Error occurred, running cleanup commands:");
            if let Err(cleanup_err) = self.run_all(cleanup, "cleanup") {
                warn!("cleanup commands failed: {cleanup_err}");
            }
        }
        result
    }

    /// Executes one command via the shell, inheriting stdout/stderr so
    /// output streams live.
    fn run(&self, command: &str) -> Result<()> {
        if command.is_empty() {
            return Err(Error::HookError("empty command".to_string()));
        }

        let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
        let status = Command::new(shell)
            .arg("-c")
            .arg(command)
            .current_dir(&self.work_dir)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        if !status.success() {
            return Err(Error::HookError(format!("exited with {status}")));
        }

        Ok(())
    }
}
