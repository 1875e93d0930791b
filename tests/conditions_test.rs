use std::collections::HashMap;
use std::fs;

use otter::conditions::Condition;
use otter::error::Error;
use otter::runtime::RuntimeContext;
use tempfile::TempDir;

fn ctx_with(pairs: &[(&str, &str)]) -> RuntimeContext {
    let env = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    RuntimeContext::new("linux", "x86_64", "/tmp", env)
}

#[test]
fn test_parse_splits_on_first_equals() {
    let condition = Condition::parse("env=stage=canary").unwrap();
    assert_eq!(condition.key, "env");
    assert_eq!(condition.value, "stage=canary");
}

#[test]
fn test_parse_without_equals_is_error() {
    match Condition::parse("production").unwrap_err() {
        Error::ConditionError { condition, .. } => assert_eq!(condition, "production"),
        other => panic!("expected ConditionError, got {other:?}"),
    }
}

#[test]
fn test_os_and_arch_compare_against_platform() {
    let ctx = ctx_with(&[]);
    assert!(Condition::parse("os=linux").unwrap().evaluate(&ctx));
    assert!(!Condition::parse("os=plan9").unwrap().evaluate(&ctx));
    assert!(Condition::parse("arch=x86_64").unwrap().evaluate(&ctx));
    assert!(!Condition::parse("arch=riscv64").unwrap().evaluate(&ctx));
}

#[test]
fn test_env_defaults_to_development() {
    // With no OTTER_ENV/ENV/NODE_ENV, env=development applies and
    // env=production does not
    let ctx = ctx_with(&[]);
    assert!(Condition::parse("env=development").unwrap().evaluate(&ctx));
    assert!(!Condition::parse("env=production").unwrap().evaluate(&ctx));
}

#[test]
fn test_env_resolution_priority() {
    let ctx = ctx_with(&[("OTTER_ENV", "staging"), ("ENV", "prod"), ("NODE_ENV", "test")]);
    assert!(Condition::parse("env=staging").unwrap().evaluate(&ctx));

    let ctx = ctx_with(&[("ENV", "prod"), ("NODE_ENV", "test")]);
    assert!(Condition::parse("env=prod").unwrap().evaluate(&ctx));

    let ctx = ctx_with(&[("NODE_ENV", "test")]);
    assert!(Condition::parse("environment=test").unwrap().evaluate(&ctx));
}

#[test]
fn test_editor_from_environment() {
    let ctx = ctx_with(&[("OTTER_EDITOR", "helix"), ("EDITOR", "vim")]);
    assert!(Condition::parse("editor=helix").unwrap().evaluate(&ctx));

    let ctx = ctx_with(&[("EDITOR", "vim")]);
    assert!(Condition::parse("editor=vim").unwrap().evaluate(&ctx));
}

#[test]
fn test_editor_detected_from_marker_directory() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(".vscode")).unwrap();

    let ctx = RuntimeContext::new("linux", "x86_64", dir.path(), HashMap::new());
    assert!(Condition::parse("editor=vscode").unwrap().evaluate(&ctx));
    assert!(!Condition::parse("editor=cursor").unwrap().evaluate(&ctx));
}

#[test]
fn test_custom_key_compares_scoped_environment() {
    let ctx = ctx_with(&[("OTTER_TEAM", "platform")]);
    assert!(Condition::parse("team=platform").unwrap().evaluate(&ctx));
    assert!(!Condition::parse("team=frontend").unwrap().evaluate(&ctx));

    // Unset custom keys compare against the empty string
    let ctx = ctx_with(&[]);
    assert!(!Condition::parse("team=platform").unwrap().evaluate(&ctx));
}
