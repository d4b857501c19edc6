//! Subprocess runner for kiln.
//!
//! Every external tool goes through this module. Commands receive an explicit
//! working directory (the process-wide current directory is never mutated)
//! and inherit stdio, so operators see tool output directly; only the exit
//! status is interpreted.

use std::path::Path;
use std::process::{Command, ExitStatus};

/// Run a command with the given working directory, inheriting stdio.
///
/// Returns the exit status on completion, whether or not it is zero; callers
/// decide what a non-zero status means for their stage. A spawn failure
/// (program missing, cwd gone) is returned as a message with a PATH hint.
pub fn run_tool(
    program: &str,
    args: &[String],
    cwd: &Path,
) -> std::result::Result<ExitStatus, String> {
    Command::new(program)
        .args(args)
        .current_dir(cwd)
        .status()
        .map_err(|e| {
            format!(
                "failed to execute {}: {}\nFix: ensure '{}' is installed and in PATH.",
                program, e, program
            )
        })
}

/// Exit code of a finished process, `-1` when terminated by a signal.
pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

/// Render a command line for progress output and error messages.
pub fn display_command(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
