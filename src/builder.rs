//! Build orchestration.
//!
//! Sequences one build run: parse the configuration, run the global
//! before hooks, filter layers by condition, then for each applicable
//! layer in declaration order run its before hooks, acquire its source,
//! merge its files and run its after hooks. The first failure anywhere
//! aborts the run, triggers the global error hooks (best-effort) and
//! surfaces the original error.

use std::fs;
use std::path::Path;

use log::warn;

use crate::config::{parse_config, BuildPlan, LayerSpec};
use crate::constants::{CACHE_DIR, IGNORE_FILE, LOCAL_REVISION, OTTER_DIR};
use crate::error::{Error, Result};
use crate::hooks::CommandExecutor;
use crate::ignore::read_ignore_file;
use crate::loader::LayerResolver;
use crate::merge::merge_layer;
use crate::runtime::RuntimeContext;

/// Outcome of a successful build run.
#[derive(Debug)]
pub struct BuildReport {
    pub layers_applied: usize,
}

/// Runs a full build for the project rooted at `project_root`, driven by
/// the configuration file at `config_path`.
pub fn build(
    project_root: &Path,
    config_path: &Path,
    ctx: &RuntimeContext,
) -> Result<BuildReport> {
    let otter_dir = project_root.join(OTTER_DIR);
    if !otter_dir.exists() {
        return Err(Error::NotInitializedError {
            project_dir: project_root.display().to_string(),
        });
    }
    let cache_dir = otter_dir.join(CACHE_DIR);

    let text = fs::read_to_string(config_path)?;
    let plan = parse_config(&text, ctx)?;

    if plan.layers.is_empty() {
        println!("No layers defined in configuration file.");
        return Ok(BuildReport { layers_applied: 0 });
    }

    let executor = CommandExecutor::new(project_root);
    let resolver = LayerResolver::new(cache_dir, project_root);

    match execute_plan(&plan, project_root, &executor, &resolver, ctx) {
        Ok(layers_applied) => {
            println!("\nBuild completed successfully! Applied {layers_applied} layer(s).");
            Ok(BuildReport { layers_applied })
        }
        Err(err) => {
            // Compensating hooks are best-effort; the original failure is
            // what the caller sees
            if !plan.on_error.is_empty() {
                println!("Build failed, running error hooks:");
                if let Err(hook_err) = executor.run_all(&plan.on_error, "error") {
                    warn!("error hooks failed: {hook_err}");
                }
            }
            Err(err)
        }
    }
}

fn execute_plan(
    plan: &BuildPlan,
    project_root: &Path,
    executor: &CommandExecutor,
    resolver: &LayerResolver,
    ctx: &RuntimeContext,
) -> Result<usize> {
    executor.run_all(&plan.on_before_build, "pre-build")?;

    let applicable = plan.applicable_layers(ctx)?;
    if applicable.is_empty() {
        println!("No layers are applicable for current environment.");
        executor.run_all(&plan.on_after_build, "post-build")?;
        return Ok(0);
    }

    if applicable.len() < plan.layers.len() {
        println!(
            "Found {} layer(s), applying {} layer(s) based on conditions:",
            plan.layers.len(),
            applicable.len()
        );
    } else {
        println!("Found {} layer(s) to process:", applicable.len());
    }

    let project_patterns = read_ignore_file(&project_root.join(IGNORE_FILE))?;

    for (i, layer) in applicable.iter().enumerate() {
        println!("\n[{}/{}] Processing layer: {}", i + 1, applicable.len(), layer.source);
        if let Some(condition) = &layer.condition {
            println!("  Condition: {condition}");
        }

        apply_layer(layer, project_root, executor, resolver, &project_patterns)
            .map_err(|e| with_layer_context(e, &layer.source))?;

        println!("  Layer applied successfully");
    }

    executor.run_all(&plan.on_after_build, "post-build")?;
    Ok(applicable.len())
}

fn apply_layer(
    layer: &LayerSpec,
    project_root: &Path,
    executor: &CommandExecutor,
    resolver: &LayerResolver,
    project_patterns: &[String],
) -> Result<()> {
    executor.run_all(&layer.before, "before-layer")?;

    let resolved = resolver.resolve(&layer.source)?;

    let target_dir = if layer.target == "." {
        project_root.to_path_buf()
    } else {
        project_root.join(&layer.target)
    };
    println!("  Target directory: {}", target_dir.display());

    merge_layer(
        &resolved.path,
        &target_dir,
        project_root,
        &layer.template_vars,
        project_patterns,
    )?;

    if resolved.revision == LOCAL_REVISION {
        println!("  Layer revision: {LOCAL_REVISION}");
    } else {
        let short = &resolved.revision[..resolved.revision.len().min(8)];
        println!("  Layer commit: {short}");
    }

    executor.run_all(&layer.after, "after-layer")?;
    Ok(())
}

/// Adds the failing layer to acquisition, merge and hook errors without
/// changing their kind.
fn with_layer_context(err: Error, layer: &str) -> Error {
    match err {
        Error::AcquisitionError(m) => Error::AcquisitionError(format!("layer '{layer}': {m}")),
        Error::MergeError(m) => Error::MergeError(format!("layer '{layer}': {m}")),
        Error::HookError(m) => Error::HookError(format!("layer '{layer}': {m}")),
        Error::Git2Error(e) => Error::AcquisitionError(format!("layer '{layer}': {e}")),
        other => other,
    }
}
