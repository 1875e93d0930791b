//! Three-tier `${NAME}` variable substitution.
//!
//! Resolution order, highest priority first:
//! 1. variables defined in the build plan,
//! 2. the `OTTER_` + uppercased name environment variable,
//! 3. the environment variable literally named `NAME`.
//!
//! Placeholders that resolve nowhere are left verbatim; substitution never
//! fails.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};

use crate::runtime::RuntimeContext;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").unwrap())
}

/// Replaces every resolvable `${NAME}` placeholder in `text`.
///
/// Unresolved placeholders (and malformed ones missing the closing brace)
/// are left untouched. Empty environment values count as unset and fall
/// through to the next tier.
pub fn substitute(
    text: &str,
    variables: &IndexMap<String, String>,
    ctx: &RuntimeContext,
) -> String {
    placeholder_re()
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            if let Some(value) = variables.get(name) {
                return value.clone();
            }
            if let Some(value) = ctx.scoped_env(name) {
                return value.to_string();
            }
            if let Some(value) = ctx.env(name) {
                return value.to_string();
            }
            caps[0].to_string()
        })
        .into_owned()
}
