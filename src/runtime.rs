//! Runtime context for variable resolution and condition evaluation.
//! Instead of reading the ambient process environment in place, the
//! platform identifiers, working directory and an environment snapshot are
//! captured once and passed explicitly, so resolution and evaluation are
//! pure functions of their inputs.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::constants::ENV_PREFIX;
use crate::error::Result;

/// Snapshot of the ambient execution context a build runs in.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    /// Operating system identifier (`std::env::consts::OS`)
    pub os: String,
    /// CPU architecture identifier (`std::env::consts::ARCH`)
    pub arch: String,
    /// Working directory, used as the project root and for editor probing
    pub cwd: PathBuf,
    env: HashMap<String, String>,
}

impl RuntimeContext {
    /// Creates a context from explicit values. Primarily useful in tests,
    /// where mutating the real process environment would race.
    pub fn new(
        os: impl Into<String>,
        arch: impl Into<String>,
        cwd: impl Into<PathBuf>,
        env: HashMap<String, String>,
    ) -> Self {
        Self { os: os.into(), arch: arch.into(), cwd: cwd.into(), env }
    }

    /// Captures the current process environment and platform.
    pub fn from_process() -> Result<Self> {
        Ok(Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            cwd: std::env::current_dir()?,
            env: std::env::vars().collect(),
        })
    }

    /// Looks up an environment variable. Empty values are treated as unset
    /// and fall through to the next resolution tier.
    pub fn env(&self, name: &str) -> Option<&str> {
        self.env.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Looks up the tool-scoped form of a name: `OTTER_` + uppercased name.
    pub fn scoped_env(&self, name: &str) -> Option<&str> {
        self.env(&format!("{}{}", ENV_PREFIX, name.to_uppercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(pairs: &[(&str, &str)]) -> RuntimeContext {
        let env = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        RuntimeContext::new("linux", "x86_64", "/tmp", env)
    }

    #[test]
    fn test_empty_value_is_unset() {
        let ctx = ctx(&[("EMPTY", ""), ("SET", "value")]);
        assert_eq!(ctx.env("EMPTY"), None);
        assert_eq!(ctx.env("SET"), Some("value"));
        assert_eq!(ctx.env("MISSING"), None);
    }

    #[test]
    fn test_scoped_env_uppercases() {
        let ctx = ctx(&[("OTTER_PROJECT", "demo")]);
        assert_eq!(ctx.scoped_env("project"), Some("demo"));
        assert_eq!(ctx.scoped_env("PROJECT"), Some("demo"));
    }
}
