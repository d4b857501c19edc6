//! Configuration model for kiln.
//!
//! The config file is YAML with forward-compatible parsing (unknown fields are
//! ignored) and sensible defaults for every field. The defaults reproduce the
//! reference setup: cookiecutter-rendered singer tap scaffolds, verified with
//! poetry-managed tools. Gate order in the file is execution order.

use crate::error::{KilnError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One quality gate: a named command run against the generated library.
///
/// The command string is split shell-style; the discovered library directory
/// is appended as the final argument when the gate runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateStep {
    /// Short name used in progress output and failure reports.
    pub name: String,

    /// Command to run, e.g. `poetry run black`.
    pub command: String,
}

impl GateStep {
    /// Convenience constructor for defaults and tests.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
        }
    }
}

/// Configuration for a kiln run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory under which generated projects are placed (default: /tmp).
    #[serde(default = "default_build_root")]
    pub build_root: PathBuf,

    /// Package name of the self-referential dependency to repoint at the
    /// local development tree.
    #[serde(default = "default_dependency_package")]
    pub dependency_package: String,

    /// Name prefixes that identify the generated library directory.
    #[serde(default = "default_library_prefixes")]
    pub library_prefixes: Vec<String>,

    /// Program that renders a directory tree from template + replay file.
    #[serde(default = "default_engine_command")]
    pub engine_command: String,

    /// Program whose `lock` and `install` subcommands set up the generated
    /// project's isolated environment.
    #[serde(default = "default_package_manager")]
    pub package_manager: String,

    /// Ordered quality gates. Later gates assume earlier ones already
    /// normalized formatting and imports; do not reorder.
    #[serde(default = "default_gates")]
    pub gates: Vec<GateStep>,

    /// Aggregate lint command, run verbatim after the standard gates.
    #[serde(default = "default_aggregate_command")]
    pub aggregate_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            build_root: default_build_root(),
            dependency_package: default_dependency_package(),
            library_prefixes: default_library_prefixes(),
            engine_command: default_engine_command(),
            package_manager: default_package_manager(),
            gates: default_gates(),
            aggregate_command: default_aggregate_command(),
        }
    }
}

fn default_build_root() -> PathBuf {
    PathBuf::from("/tmp")
}

fn default_dependency_package() -> String {
    "singer-sdk".to_string()
}

fn default_library_prefixes() -> Vec<String> {
    vec!["tap".to_string(), "target".to_string()]
}

fn default_engine_command() -> String {
    "cookiecutter".to_string()
}

fn default_package_manager() -> String {
    "poetry".to_string()
}

fn default_gates() -> Vec<GateStep> {
    vec![
        GateStep::new("format", "poetry run black"),
        GateStep::new("imports", "poetry run isort"),
        GateStep::new("lint", "poetry run flake8"),
        GateStep::new("typecheck", "poetry run mypy"),
    ]
}

fn default_aggregate_command() -> String {
    "poetry run tox -e lint".to_string()
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// Missing fields fall back to defaults; unknown fields are ignored for
    /// forward compatibility. A missing or unreadable file is a usage error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            KilnError::Usage(format!("failed to read config '{}': {}", path.display(), e))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            KilnError::Usage(format!("failed to parse config '{}': {}", path.display(), e))
        })
    }

    /// Validate config values before the pipeline starts.
    ///
    /// Catching an unparsable gate command here means no subprocess has been
    /// spawned yet when the run aborts.
    pub fn validate(&self) -> Result<()> {
        if self.dependency_package.trim().is_empty() {
            return Err(KilnError::Usage(
                "config: dependency_package must not be empty".to_string(),
            ));
        }

        if self.library_prefixes.iter().all(|p| p.trim().is_empty()) {
            return Err(KilnError::Usage(
                "config: library_prefixes must contain at least one non-empty prefix".to_string(),
            ));
        }

        if self.engine_command.trim().is_empty() {
            return Err(KilnError::Usage(
                "config: engine_command must not be empty".to_string(),
            ));
        }

        if self.package_manager.trim().is_empty() {
            return Err(KilnError::Usage(
                "config: package_manager must not be empty".to_string(),
            ));
        }

        if self.gates.is_empty() {
            return Err(KilnError::Usage(
                "config: gates must contain at least one step".to_string(),
            ));
        }

        for gate in &self.gates {
            if gate.name.trim().is_empty() {
                return Err(KilnError::Usage(
                    "config: every gate must have a name".to_string(),
                ));
            }
            validate_command(&gate.command, &format!("gate '{}'", gate.name))?;
        }

        validate_command(&self.aggregate_command, "aggregate_command")?;

        Ok(())
    }
}

/// Check that a command string is non-empty and splits shell-style.
fn validate_command(command: &str, what: &str) -> Result<()> {
    let args = shell_words::split(command.trim()).map_err(|e| {
        KilnError::Usage(format!(
            "config: {} has an unparsable command: {}\nCommand: {}\nFix: check for unmatched quotes or invalid escape sequences.",
            what, e, command
        ))
    })?;

    if args.is_empty() {
        return Err(KilnError::Usage(format!(
            "config: {} has an empty command",
            what
        )));
    }

    Ok(())
}
