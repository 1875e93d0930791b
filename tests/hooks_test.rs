use otter::error::Error;
use otter::hooks::CommandExecutor;
use tempfile::TempDir;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_empty_command_list_is_noop_success() {
    let dir = TempDir::new().unwrap();
    let executor = CommandExecutor::new(dir.path());
    assert!(executor.run_all(&[], "pre-build").is_ok());
}

#[test]
fn test_commands_run_in_order_in_working_directory() {
    let dir = TempDir::new().unwrap();
    let executor = CommandExecutor::new(dir.path());

    executor
        .run_all(&strings(&["touch first", "cp first second"]), "pre-build")
        .unwrap();

    assert!(dir.path().join("first").exists());
    assert!(dir.path().join("second").exists());
}

#[test]
fn test_failure_stops_remaining_commands() {
    // ["true", "false", ...]: the second command fails, the third never runs
    let dir = TempDir::new().unwrap();
    let executor = CommandExecutor::new(dir.path());

    let err = executor
        .run_all(&strings(&["true", "false", "touch unreachable"]), "before-layer")
        .unwrap_err();

    match err {
        Error::HookError(message) => {
            assert!(message.contains("'false'"), "message: {message}");
            assert!(message.contains("before-layer"), "message: {message}");
        }
        other => panic!("expected HookError, got {other:?}"),
    }
    assert!(!dir.path().join("unreachable").exists());
}

#[test]
fn test_cleanup_runs_after_primary_failure() {
    let dir = TempDir::new().unwrap();
    let executor = CommandExecutor::new(dir.path());

    let result = executor.run_all_with_cleanup(
        &strings(&["false"]),
        "pre-build",
        &strings(&["touch cleaned"]),
    );

    assert!(result.is_err());
    assert!(dir.path().join("cleaned").exists());
}

#[test]
fn test_cleanup_does_not_run_on_success() {
    let dir = TempDir::new().unwrap();
    let executor = CommandExecutor::new(dir.path());

    executor
        .run_all_with_cleanup(&strings(&["true"]), "pre-build", &strings(&["touch cleaned"]))
        .unwrap();

    assert!(!dir.path().join("cleaned").exists());
}

#[test]
fn test_cleanup_failure_never_masks_primary_error() {
    let dir = TempDir::new().unwrap();
    let executor = CommandExecutor::new(dir.path());

    let err = executor
        .run_all_with_cleanup(
            &strings(&["sh -c 'exit 7'"]),
            "pre-build",
            &strings(&["false"]),
        )
        .unwrap_err();

    match err {
        Error::HookError(message) => {
            assert!(message.contains("pre-build"), "message: {message}");
            assert!(!message.contains("cleanup"), "message: {message}");
        }
        other => panic!("expected HookError, got {other:?}"),
    }
}

#[test]
fn test_empty_command_string_is_error() {
    let dir = TempDir::new().unwrap();
    let executor = CommandExecutor::new(dir.path());
    assert!(executor.run_all(&strings(&[""]), "pre-build").is_err());
}
