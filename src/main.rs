//! kiln: template-scaffold verification pipeline.
//!
//! This is the main entry point for the `kiln` CLI. It parses arguments,
//! loads configuration, resolves inputs, runs the pipeline, and handles
//! errors with proper exit codes.

mod cli;
mod config;
mod error;
mod events;
mod exit_codes;
mod generate;
mod inputs;
mod patch;
mod pipeline;
mod proc;
mod verify;

use cli::Cli;
use config::Config;
use error::Result;
use pipeline::RunOptions;
use std::process::ExitCode;

fn main() -> ExitCode {
    match Cli::parse_args().and_then(run) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(build_root) = &cli.build_root {
        config.build_root = build_root.clone();
    }
    config.validate()?;

    let inputs = inputs::resolve(&cli.template, &cli.replay_file, &config.build_root)?;

    pipeline::run(
        &config,
        &inputs,
        &RunOptions {
            run_aggregate: cli.run_aggregate(),
            dry_run: cli.dry_run,
        },
    )
}
