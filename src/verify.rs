//! Verification runner: library discovery plus the quality-gate battery.
//!
//! Discovery is a typed contract: exactly one immediate child directory of the
//! generated project may match a recognized prefix. Zero matches and multiple
//! matches are both errors, with the candidates listed. The gates then run in
//! configured order with the project as working directory, stopping at the
//! first non-zero exit.

use crate::config::Config;
use crate::error::{KilnError, Result};
use crate::proc;
use std::fs;
use std::path::Path;

/// Find the generated library directory by prefix match.
///
/// The exact name depends on template rendering of user-supplied answers, so
/// it is discovered after generation rather than derived up front.
pub fn discover_library(project_dir: &Path, prefixes: &[String]) -> Result<String> {
    let entries = fs::read_dir(project_dir).map_err(|e| {
        KilnError::Discovery(format!(
            "failed to scan '{}': {}",
            project_dir.display(),
            e
        ))
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            KilnError::Discovery(format!(
                "failed to scan '{}': {}",
                project_dir.display(),
                e
            ))
        })?;

        if !entry.path().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if prefixes.iter().any(|p| !p.is_empty() && name.starts_with(p)) {
            candidates.push(name);
        }
    }
    candidates.sort();

    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => Err(KilnError::Discovery(format!(
            "no child directory of '{}' starts with any of [{}]",
            project_dir.display(),
            prefixes.join(", ")
        ))),
        _ => Err(KilnError::Discovery(format!(
            "multiple child directories of '{}' match [{}]: {}",
            project_dir.display(),
            prefixes.join(", "),
            candidates.join(", ")
        ))),
    }
}

/// Run the quality gates in order, fail-fast, then the optional aggregate pass.
///
/// Each gate command gets the library directory appended as its final
/// argument; the aggregate command runs verbatim. Tool output is passed
/// through for human consumption, never parsed.
pub fn run_gates(
    config: &Config,
    project_dir: &Path,
    library: &str,
    run_aggregate: bool,
) -> Result<()> {
    for gate in &config.gates {
        run_gate(&gate.name, &gate.command, Some(library), project_dir)?;
    }

    if run_aggregate {
        run_gate("aggregate", &config.aggregate_command, None, project_dir)?;
    }

    Ok(())
}

fn run_gate(name: &str, command: &str, target: Option<&str>, cwd: &Path) -> Result<()> {
    // Config validation already vetted these; re-checking keeps run_gate safe
    // to call on its own.
    let mut args = shell_words::split(command.trim()).map_err(|e| {
        KilnError::Usage(format!(
            "gate '{}': failed to parse command: {}\nCommand: {}",
            name, e, command
        ))
    })?;
    if args.is_empty() {
        return Err(KilnError::Usage(format!("gate '{}': command is empty", name)));
    }

    if let Some(target) = target {
        args.push(target.to_string());
    }
    let program = args.remove(0);

    println!("Running gate '{}': {}", name, proc::display_command(&program, &args));

    let status = proc::run_tool(&program, &args, cwd)
        .map_err(|e| KilnError::Verification(format!("gate '{}': {}", name, e)))?;

    if status.success() {
        Ok(())
    } else {
        Err(KilnError::Verification(format!(
            "gate '{}' ({}) exited with status {}",
            name,
            proc::display_command(&program, &args),
            proc::exit_code(status)
        )))
    }
}
