//! Condition parsing and evaluation for conditional layers.
//! A condition is a `key=value` predicate evaluated against the runtime
//! context; a layer without a condition always applies.

use crate::error::{Error, Result};
use crate::runtime::RuntimeContext;

/// A parsed `key=value` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub key: String,
    pub value: String,
}

impl Condition {
    /// Parses a condition string. Only the first `=` splits key from
    /// value, so values may themselves contain `=`.
    pub fn parse(condition: &str) -> Result<Self> {
        if condition.is_empty() {
            return Err(Error::ConditionError {
                condition: condition.to_string(),
                message: "condition cannot be empty".to_string(),
            });
        }

        let Some((key, value)) = condition.split_once('=') else {
            return Err(Error::ConditionError {
                condition: condition.to_string(),
                message: "condition must be in format 'key=value'".to_string(),
            });
        };

        Ok(Self { key: key.trim().to_string(), value: value.trim().to_string() })
    }

    /// Evaluates the condition against the given runtime context.
    ///
    /// `os`/`arch` compare against the running platform, `env` (alias
    /// `environment`) against the resolved build environment, `editor`
    /// against the configured or detected editor, and any other key
    /// against the `OTTER_` + uppercased-key environment variable.
    pub fn evaluate(&self, ctx: &RuntimeContext) -> bool {
        match self.key.as_str() {
            "os" => self.value == ctx.os,
            "arch" => self.value == ctx.arch,
            "env" | "environment" => self.value == current_environment(ctx),
            "editor" => self.value == detect_editor(ctx),
            _ => self.value == ctx.scoped_env(&self.key).unwrap_or(""),
        }
    }
}

/// Resolves the build environment: `OTTER_ENV`, then `ENV`, then
/// `NODE_ENV`, defaulting to `development`.
fn current_environment(ctx: &RuntimeContext) -> &str {
    ctx.env("OTTER_ENV")
        .or_else(|| ctx.env("ENV"))
        .or_else(|| ctx.env("NODE_ENV"))
        .unwrap_or("development")
}

/// Resolves the editor: `OTTER_EDITOR`, then `EDITOR`, then probing for
/// editor marker directories in the working directory.
fn detect_editor(ctx: &RuntimeContext) -> String {
    if let Some(editor) = ctx.env("OTTER_EDITOR").or_else(|| ctx.env("EDITOR")) {
        return editor.to_string();
    }
    if ctx.cwd.join(".vscode").exists() {
        return "vscode".to_string();
    }
    if ctx.cwd.join(".cursor").exists() {
        return "cursor".to_string();
    }
    String::new()
}
