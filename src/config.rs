//! Otterfile parsing into a build plan.
//!
//! The grammar is line-oriented: one logical statement per line, with a
//! trailing `\` joining the following physical line, `#` comments and
//! blank lines ignored outside continuations. Errors are always located
//! by the 1-based line number of the statement's first physical line.

use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;

use crate::conditions::Condition;
use crate::constants::CONFIG_FILES;
use crate::error::{Error, Result};
use crate::runtime::RuntimeContext;
use crate::variables::substitute;

/// One declared layer from a `LAYER` statement.
#[derive(Debug, Clone, Default)]
pub struct LayerSpec {
    /// Git remote, local/relative/absolute path, or file:// URI
    pub source: String,
    /// Merge destination relative to the project root; `.` is the root
    pub target: String,
    /// Optional `key=value` condition; absent means "always apply"
    pub condition: Option<String>,
    /// Variables passed to per-file template rendering
    pub template_vars: IndexMap<String, String>,
    /// Commands run immediately before the layer's files are merged
    pub before: Vec<String>,
    /// Commands run immediately after the layer's files are merged
    pub after: Vec<String>,
}

impl LayerSpec {
    /// Whether the layer applies in the given runtime context.
    pub fn should_apply(&self, ctx: &RuntimeContext) -> Result<bool> {
        match &self.condition {
            None => Ok(true),
            Some(condition) => Ok(Condition::parse(condition)?.evaluate(ctx)),
        }
    }
}

/// The parsed, in-memory representation of an Otterfile.
#[derive(Debug, Default)]
pub struct BuildPlan {
    /// Variables defined with `VAR`, in definition order
    pub variables: IndexMap<String, String>,
    /// Declared layers; order is the application order
    pub layers: Vec<LayerSpec>,
    /// Global commands run once before any layer
    pub on_before_build: Vec<String>,
    /// Global commands run once after all layers succeeded
    pub on_after_build: Vec<String>,
    /// Global compensation commands run when the build fails
    pub on_error: Vec<String>,
}

impl BuildPlan {
    /// Filters layers by their conditions, preserving declaration order.
    pub fn applicable_layers(&self, ctx: &RuntimeContext) -> Result<Vec<&LayerSpec>> {
        let mut applicable = Vec::new();
        for layer in &self.layers {
            if layer.should_apply(ctx)? {
                applicable.push(layer);
            }
        }
        Ok(applicable)
    }
}

/// Locates the configuration file by its conventional names.
pub fn find_config_file(dir: &Path) -> Result<PathBuf> {
    for candidate in CONFIG_FILES {
        let path = dir.join(candidate);
        if path.is_file() {
            return Ok(path);
        }
    }
    Err(Error::ConfigNotFoundError {
        dir: dir.display().to_string(),
        tried: CONFIG_FILES.join(", "),
    })
}

/// Parses the full text of an Otterfile into a [`BuildPlan`].
pub fn parse_config(text: &str, ctx: &RuntimeContext) -> Result<BuildPlan> {
    let mut plan = BuildPlan::default();
    for line in logical_lines(text)? {
        parse_statement(&line, &mut plan, ctx)?;
    }
    Ok(plan)
}

/// A logical statement with the line number it started on.
struct LogicalLine {
    number: usize,
    text: String,
}

/// Joins physical lines into logical statements, handling `\`
/// continuations. Comments and blank lines only terminate between
/// statements; inside a continuation they are consumed as content.
fn logical_lines(text: &str) -> Result<Vec<LogicalLine>> {
    let mut lines = Vec::new();
    let mut pending = String::new();
    let mut start = 0;

    for (idx, raw) in text.lines().enumerate() {
        let number = idx + 1;
        let line = raw.trim();

        if pending.is_empty() && (line.is_empty() || line.starts_with('#')) {
            continue;
        }

        if let Some(stripped) = line.strip_suffix('\\') {
            if pending.is_empty() {
                start = number;
            } else {
                pending.push(' ');
            }
            pending.push_str(stripped.trim());
            continue;
        }

        if pending.is_empty() {
            lines.push(LogicalLine { number, text: line.to_string() });
        } else {
            pending.push(' ');
            pending.push_str(line);
            lines.push(LogicalLine { number: start, text: std::mem::take(&mut pending) });
        }
    }

    if !pending.is_empty() {
        return Err(config_error(start, "unterminated line continuation"));
    }

    Ok(lines)
}

fn config_error(line: usize, message: impl Into<String>) -> Error {
    Error::ConfigError { line, message: message.into() }
}

fn parse_statement(line: &LogicalLine, plan: &mut BuildPlan, ctx: &RuntimeContext) -> Result<()> {
    let tokens: Vec<&str> = line.text.split_whitespace().collect();
    let Some((&command, args)) = tokens.split_first() else {
        return Ok(());
    };

    match command.to_uppercase().as_str() {
        "VAR" => parse_var(args, line.number, plan, ctx),
        "LAYER" => parse_layer(args, line.number, plan, ctx),
        "ON_BEFORE_BUILD:" => {
            plan.on_before_build = parse_command_array(args, line.number, "hook")?;
            Ok(())
        }
        "ON_AFTER_BUILD:" => {
            plan.on_after_build = parse_command_array(args, line.number, "hook")?;
            Ok(())
        }
        "ON_ERROR:" => {
            plan.on_error = parse_command_array(args, line.number, "hook")?;
            Ok(())
        }
        other => Err(config_error(line.number, format!("unknown command: {other}"))),
    }
}

fn parse_var(args: &[&str], line: usize, plan: &mut BuildPlan, ctx: &RuntimeContext) -> Result<()> {
    if args.is_empty() {
        return Err(config_error(line, "VAR command requires a variable definition"));
    }

    // Rejoin so values may contain embedded whitespace
    let definition = args.join(" ");
    let Some((name, value)) = definition.split_once('=') else {
        return Err(config_error(
            line,
            format!("VAR command must be in format 'KEY=VALUE', got: {definition}"),
        ));
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(config_error(line, "variable name cannot be empty"));
    }

    // Later definitions may reference earlier ones
    let resolved = substitute(value.trim(), &plan.variables, ctx);
    plan.variables.insert(name.to_string(), resolved);
    Ok(())
}

fn parse_command_array(args: &[&str], line: usize, keyword: &str) -> Result<Vec<String>> {
    if args.is_empty() {
        return Err(config_error(line, format!("{keyword} command requires a command array")));
    }
    let json = args.join(" ");
    serde_json::from_str(&json).map_err(|e| {
        config_error(line, format!("failed to parse {keyword} commands as JSON array: {e}"))
    })
}

/// Keyword arguments accepted after a LAYER's source token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayerKeyword {
    Target,
    If,
    Template,
    Before,
    After,
}

impl LayerKeyword {
    fn name(self) -> &'static str {
        match self {
            LayerKeyword::Target => "TARGET",
            LayerKeyword::If => "IF",
            LayerKeyword::Template => "TEMPLATE",
            LayerKeyword::Before => "BEFORE",
            LayerKeyword::After => "AFTER",
        }
    }
}

/// One token of a LAYER argument list: a recognized keyword, or a bare
/// value consumed by the preceding keyword.
#[derive(Debug)]
enum LayerToken<'a> {
    Keyword(LayerKeyword),
    Bare(&'a str),
}

fn classify(token: &str) -> LayerToken<'_> {
    match token.to_uppercase().as_str() {
        "TARGET" => LayerToken::Keyword(LayerKeyword::Target),
        "IF" => LayerToken::Keyword(LayerKeyword::If),
        "TEMPLATE" => LayerToken::Keyword(LayerKeyword::Template),
        "BEFORE" => LayerToken::Keyword(LayerKeyword::Before),
        "AFTER" => LayerToken::Keyword(LayerKeyword::After),
        _ => LayerToken::Bare(token),
    }
}

fn parse_layer(
    args: &[&str],
    line: usize,
    plan: &mut BuildPlan,
    ctx: &RuntimeContext,
) -> Result<()> {
    let Some((&source, rest)) = args.split_first() else {
        return Err(config_error(line, "LAYER command requires a repository URL or path"));
    };

    let mut layer =
        LayerSpec { source: source.to_string(), target: ".".to_string(), ..Default::default() };

    let mut tokens = rest.iter().copied().peekable();
    while let Some(token) = tokens.next() {
        let keyword = match classify(token) {
            LayerToken::Keyword(keyword) => keyword,
            LayerToken::Bare(other) => {
                return Err(config_error(line, format!("unknown LAYER argument: {other}")));
            }
        };

        match keyword {
            LayerKeyword::Target => {
                let Some(path) = tokens.next() else {
                    return Err(config_error(line, "TARGET requires a path argument"));
                };
                layer.target = path.to_string();
            }
            LayerKeyword::If => {
                let Some(condition) = tokens.next() else {
                    return Err(config_error(line, "IF requires a condition argument"));
                };
                layer.condition = Some(condition.to_string());
            }
            LayerKeyword::Template => {
                if tokens.peek().is_none() {
                    return Err(config_error(
                        line,
                        "TEMPLATE requires template variable assignments",
                    ));
                }
                // Consume contiguous key=value tokens; the first token
                // without '=' belongs to the next keyword
                while let Some(assignment) = tokens.peek() {
                    let Some((key, value)) = assignment.split_once('=') else {
                        break;
                    };
                    layer
                        .template_vars
                        .insert(key.trim().to_string(), value.trim().to_string());
                    tokens.next();
                }
            }
            LayerKeyword::Before => {
                layer.before = parse_inline_array(&mut tokens, line, keyword)?;
            }
            LayerKeyword::After => {
                layer.after = parse_inline_array(&mut tokens, line, keyword)?;
            }
        }
    }

    layer.source = substitute(&layer.source, &plan.variables, ctx);
    layer.target = substitute(&layer.target, &plan.variables, ctx);
    for value in layer.template_vars.values_mut() {
        *value = substitute(value, &plan.variables, ctx);
    }

    validate_target(&layer.target, line)?;

    plan.layers.push(layer);
    Ok(())
}

/// Reassembles a JSON string array that may span several whitespace-split
/// tokens: from the opening `[` token to the first token ending in `]`.
fn parse_inline_array<'a, I: Iterator<Item = &'a str>>(
    tokens: &mut std::iter::Peekable<I>,
    line: usize,
    keyword: LayerKeyword,
) -> Result<Vec<String>> {
    let name = keyword.name();
    let Some(first) = tokens.next() else {
        return Err(config_error(line, format!("{name} requires a command array")));
    };
    if !first.starts_with('[') {
        return Err(config_error(line, format!("{name} commands must be in JSON array format")));
    }

    let mut json = first.to_string();
    while !json.ends_with(']') {
        let Some(next) = tokens.next() else {
            return Err(config_error(line, format!("{name} command array not properly closed")));
        };
        json.push(' ');
        json.push_str(next);
    }

    serde_json::from_str(&json)
        .map_err(|e| config_error(line, format!("failed to parse {name} commands: {e}")))
}

/// Rejects targets that would resolve outside the project root.
fn validate_target(target: &str, line: usize) -> Result<()> {
    let path = Path::new(target);
    if path.is_absolute() {
        return Err(config_error(line, format!("TARGET must be relative, got: {target}")));
    }

    let mut depth: usize = 0;
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(_) => depth += 1,
            Component::ParentDir => {
                if depth == 0 {
                    return Err(config_error(
                        line,
                        format!("TARGET escapes the project root: {target}"),
                    ));
                }
                depth -= 1;
            }
            _ => {
                return Err(config_error(line, format!("TARGET must be relative, got: {target}")));
            }
        }
    }
    Ok(())
}
