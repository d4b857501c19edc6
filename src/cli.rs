//! CLI argument parsing for kiln.
//!
//! Uses clap derive macros for declarative argument definitions. kiln does one
//! thing, so there are no subcommands: two required positional paths, an
//! optional aggregate flag, and a handful of overrides.

use crate::error::{KilnError, Result};
use crate::exit_codes;
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;

/// kiln: template-scaffold verification pipeline.
///
/// Renders a project from a template plus a replay (answer) file, repoints the
/// generated project's self-dependency at the local development tree, installs
/// it, and runs ordered quality gates (formatter, import-sorter, linter,
/// type-checker, optional aggregate lint) against the result.
#[derive(Parser, Debug)]
#[command(name = "kiln")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the template directory.
    pub template: PathBuf,

    /// Path to the replay file supplying template answers.
    pub replay_file: PathBuf,

    /// Run the aggregate lint pass after the standard gates: 1 runs it
    /// (default when omitted), 0 skips it.
    #[arg(value_parser = clap::value_parser!(u8).range(0..=1))]
    pub aggregate: Option<u8>,

    /// Path to a YAML configuration file (defaults are used when omitted).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory under which the generated project is placed (overrides config).
    #[arg(long)]
    pub build_root: Option<PathBuf>,

    /// Resolve inputs and print the stage plan without spawning any subprocess.
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Parse command line arguments.
    ///
    /// Bad arguments (wrong arity, out-of-range flag values) are usage
    /// errors in kiln's own taxonomy, so they exit with the usage code
    /// rather than clap's default exit 2 — which would collide with the
    /// generation-failure code a stage-aware caller relies on. Help and
    /// version requests print and exit successfully.
    pub fn parse_args() -> Result<Self> {
        match Cli::try_parse() {
            Ok(cli) => Ok(cli),
            Err(e) => match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = e.print();
                    std::process::exit(exit_codes::SUCCESS);
                }
                _ => Err(usage_error(&e)),
            },
        }
    }

    /// Whether the aggregate lint pass should run. Omitted means run.
    pub fn run_aggregate(&self) -> bool {
        self.aggregate.unwrap_or(1) == 1
    }
}

/// Convert a clap parse error into a usage error.
fn usage_error(e: &clap::Error) -> KilnError {
    let rendered = e.to_string();
    let message = rendered.strip_prefix("error: ").unwrap_or(&rendered);
    KilnError::Usage(message.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_minimal() {
        let cli = Cli::try_parse_from(["kiln", "cookiecutter/tap-template", "answers.json"])
            .unwrap();
        assert_eq!(cli.template, PathBuf::from("cookiecutter/tap-template"));
        assert_eq!(cli.replay_file, PathBuf::from("answers.json"));
        assert_eq!(cli.aggregate, None);
        assert!(cli.run_aggregate());
        assert!(cli.config.is_none());
        assert!(cli.build_root.is_none());
        assert!(!cli.dry_run);
    }

    #[test]
    fn parse_aggregate_disabled() {
        let cli = Cli::try_parse_from(["kiln", "tpl", "answers.json", "0"]).unwrap();
        assert_eq!(cli.aggregate, Some(0));
        assert!(!cli.run_aggregate());
    }

    #[test]
    fn parse_aggregate_enabled_explicitly() {
        let cli = Cli::try_parse_from(["kiln", "tpl", "answers.json", "1"]).unwrap();
        assert_eq!(cli.aggregate, Some(1));
        assert!(cli.run_aggregate());
    }

    #[test]
    fn reject_aggregate_out_of_range() {
        assert!(Cli::try_parse_from(["kiln", "tpl", "answers.json", "2"]).is_err());
    }

    #[test]
    fn reject_missing_positional_args() {
        assert!(Cli::try_parse_from(["kiln"]).is_err());
        assert!(Cli::try_parse_from(["kiln", "tpl"]).is_err());
    }

    #[test]
    fn reject_extra_positional_args() {
        assert!(Cli::try_parse_from(["kiln", "tpl", "answers.json", "1", "extra"]).is_err());
    }

    #[test]
    fn missing_argument_maps_to_usage_exit_code() {
        let clap_err = Cli::try_parse_from(["kiln", "only-one-arg"]).unwrap_err();
        let err = usage_error(&clap_err);

        assert!(matches!(err, KilnError::Usage(_)));
        assert_eq!(err.exit_code(), exit_codes::USAGE_ERROR);
        // The message still names what is missing.
        assert!(err.to_string().contains("REPLAY_FILE"));
        // And the stage-distinct codes stay distinct: bad arity must not
        // look like a template-rendering failure.
        assert_ne!(err.exit_code(), exit_codes::GENERATION_FAILURE);
    }

    #[test]
    fn extra_argument_maps_to_usage_exit_code() {
        let clap_err =
            Cli::try_parse_from(["kiln", "tpl", "answers.json", "1", "extra"]).unwrap_err();
        let err = usage_error(&clap_err);

        assert_eq!(err.exit_code(), exit_codes::USAGE_ERROR);
    }

    #[test]
    fn usage_error_strips_claps_prefix() {
        let clap_err = Cli::try_parse_from(["kiln"]).unwrap_err();
        let err = usage_error(&clap_err);

        // `main` prepends "Error: " itself; a doubled prefix reads badly.
        assert!(!err.to_string().starts_with("error: "));
    }

    #[test]
    fn parse_overrides() {
        let cli = Cli::try_parse_from([
            "kiln",
            "tpl",
            "answers.json",
            "--config",
            "kiln.yaml",
            "--build-root",
            "/var/tmp",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("kiln.yaml")));
        assert_eq!(cli.build_root, Some(PathBuf::from("/var/tmp")));
        assert!(cli.dry_run);
    }
}
