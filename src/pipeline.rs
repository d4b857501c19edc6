//! Pipeline orchestration for kiln.
//!
//! Runs the five stages strictly in order, each stage's success a
//! precondition for the next: clean stale output, render the scaffold, patch
//! the manifest, lock and install, discover the library and run the gates.
//! Every failure aborts the run immediately; nothing is retried. The
//! generated project is left on disk for inspection whether the run passes
//! or fails.

use crate::config::Config;
use crate::error::{KilnError, Result};
use crate::events::{self, RunAction, RunEvent};
use crate::inputs::ResolvedInputs;
use crate::{generate, patch, verify};
use serde_json::json;
use std::fs;
use std::path::Path;

/// Per-run options not carried by the config file.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Run the aggregate lint pass after the standard gates.
    pub run_aggregate: bool,

    /// Print the stage plan without spawning any subprocess.
    pub dry_run: bool,
}

/// Execute the pipeline against resolved inputs.
pub fn run(config: &Config, inputs: &ResolvedInputs, opts: &RunOptions) -> Result<()> {
    if opts.dry_run {
        print_plan(config, inputs, opts);
        return Ok(());
    }

    let record = |action: RunAction, details: serde_json::Value| {
        events::record(
            &config.build_root,
            &RunEvent::new(action, &inputs.output_name).with_details(details),
        );
    };

    record(
        RunAction::Resolve,
        json!({
            "template": inputs.template.display().to_string(),
            "replay_file": inputs.replay_file.display().to_string(),
            "project_dir": inputs.project_dir.display().to_string(),
            "sdk_dir": inputs.sdk_dir.display().to_string(),
        }),
    );

    clean_stale(&config.build_root, &inputs.project_dir)?;
    record(RunAction::Clean, json!({}));

    println!(
        "Rendering '{}' with '{}' into '{}'",
        inputs.template.display(),
        inputs.replay_file.display(),
        inputs.project_dir.display()
    );
    generate::render_scaffold(config, inputs)?;
    record(RunAction::Generate, json!({}));

    println!(
        "Repointing '{}' at '{}'",
        config.dependency_package,
        inputs.sdk_dir.display()
    );
    patch::patch_manifest(
        &inputs.project_dir,
        &config.dependency_package,
        &inputs.sdk_dir,
    )?;
    record(RunAction::Patch, json!({}));

    patch::lock_and_install(config, &inputs.project_dir)?;
    record(RunAction::Install, json!({}));

    let library = verify::discover_library(&inputs.project_dir, &config.library_prefixes)?;
    println!("Discovered library directory '{}'", library);
    record(RunAction::Discover, json!({ "library": library }));

    verify::run_gates(config, &inputs.project_dir, &library, opts.run_aggregate)?;
    record(RunAction::Verify, json!({ "aggregate": opts.run_aggregate }));

    println!("All gates passed for '{}'", inputs.output_name);
    Ok(())
}

/// Remove a previous run's output so the template engine writes into a clean
/// target and verification can never reuse stale files. Safe to call when
/// nothing exists.
fn clean_stale(build_root: &Path, project_dir: &Path) -> Result<()> {
    fs::create_dir_all(build_root).map_err(|e| {
        KilnError::Usage(format!(
            "failed to create build root '{}': {}",
            build_root.display(),
            e
        ))
    })?;

    // The project dir is always derived as a child of the build root; anything
    // else means the derivation went wrong, and we must not remove it.
    if project_dir == build_root || !project_dir.starts_with(build_root) {
        return Err(KilnError::Usage(format!(
            "refusing to remove '{}': not a child of build root '{}'",
            project_dir.display(),
            build_root.display()
        )));
    }

    if project_dir.exists() {
        println!("Removing stale output '{}'", project_dir.display());
        fs::remove_dir_all(project_dir).map_err(|e| {
            KilnError::Usage(format!(
                "failed to remove stale output '{}': {}",
                project_dir.display(),
                e
            ))
        })?;
    }

    Ok(())
}

fn print_plan(config: &Config, inputs: &ResolvedInputs, opts: &RunOptions) {
    println!("Plan for '{}':", inputs.output_name);
    println!("  clean:    {}", inputs.project_dir.display());
    println!(
        "  generate: {} --replay-file {} {} -o {}",
        config.engine_command,
        inputs.replay_file.display(),
        inputs.template.display(),
        config.build_root.display()
    );
    println!(
        "  patch:    {} -> {{ path = \"{}\", develop = true }}",
        config.dependency_package,
        inputs.sdk_dir.display()
    );
    println!(
        "  install:  {} lock && {} install",
        config.package_manager, config.package_manager
    );
    for gate in &config.gates {
        println!("  gate:     {} ({})", gate.name, gate.command);
    }
    if opts.run_aggregate {
        println!("  gate:     aggregate ({})", config.aggregate_command);
    }
}
