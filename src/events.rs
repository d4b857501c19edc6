//! Run logging for kiln.
//!
//! Appends one NDJSON line per completed stage to `kiln-events.ndjson` in the
//! build root, so successive runs against the same scratch location leave an
//! inspectable trail. Each line carries:
//! - `ts`: RFC3339 timestamp
//! - `action`: the stage that completed (resolve, clean, generate, ...)
//! - `actor`: the owner string (e.g. `user@HOST`)
//! - `run`: the OutputName of the generated project
//! - `details`: freeform object with stage-specific details
//!
//! The log is diagnostic only. Unlike workflow state, a failed append must not
//! abort a verification run, so callers go through [`record`], which degrades
//! to a stderr warning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Pipeline stages that get logged on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunAction {
    /// Inputs validated and secondary paths derived
    Resolve,
    /// Stale output removed (or confirmed absent)
    Clean,
    /// Scaffold rendered by the template engine
    Generate,
    /// Manifest repointed at the local SDK tree
    Patch,
    /// Dependencies locked and installed
    Install,
    /// Library directory identified
    Discover,
    /// All quality gates passed
    Verify,
}

impl std::fmt::Display for RunAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunAction::Resolve => write!(f, "resolve"),
            RunAction::Clean => write!(f, "clean"),
            RunAction::Generate => write!(f, "generate"),
            RunAction::Patch => write!(f, "patch"),
            RunAction::Install => write!(f, "install"),
            RunAction::Discover => write!(f, "discover"),
            RunAction::Verify => write!(f, "verify"),
        }
    }
}

/// One record in the run log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    /// RFC3339 timestamp when the stage completed.
    pub ts: DateTime<Utc>,

    /// The stage that completed.
    pub action: RunAction,

    /// The actor who ran the pipeline (e.g. `user@HOST`).
    pub actor: String,

    /// OutputName of the generated project this run targets.
    pub run: String,

    /// Freeform details object with stage-specific information.
    pub details: Value,
}

impl RunEvent {
    /// Create a new event for the given stage and run.
    ///
    /// The timestamp is set to the current time, and the actor is determined
    /// from the environment (USER@HOSTNAME).
    pub fn new(action: RunAction, run: impl Into<String>) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: actor_string(),
            run: run.into(),
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    fn to_ndjson_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Get the actor string for event metadata.
fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Path of the run log under the build root.
pub fn log_path(build_root: &Path) -> PathBuf {
    build_root.join("kiln-events.ndjson")
}

/// Append an event to the run log, degrading to a stderr warning on failure.
pub fn record(build_root: &Path, event: &RunEvent) {
    if let Err(e) = append_event(build_root, event) {
        eprintln!("Warning: could not append to run log: {}", e);
    }
}

fn append_event(build_root: &Path, event: &RunEvent) -> std::result::Result<(), String> {
    let log_file = log_path(build_root);

    let json_line = event
        .to_ndjson_line()
        .map_err(|e| format!("failed to serialize event: {}", e))?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .map_err(|e| format!("failed to open '{}': {}", log_file.display(), e))?;

    writeln!(file, "{}", json_line)
        .map_err(|e| format!("failed to write '{}': {}", log_file.display(), e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn events_append_as_ndjson_lines() {
        let temp = TempDir::new().unwrap();

        record(
            temp.path(),
            &RunEvent::new(RunAction::Generate, "tap-demo"),
        );
        record(
            temp.path(),
            &RunEvent::new(RunAction::Discover, "tap-demo")
                .with_details(json!({"library": "tap_demo"})),
        );

        let contents = std::fs::read_to_string(log_path(temp.path())).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: RunEvent = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.action, RunAction::Generate);
        assert_eq!(first.run, "tap-demo");
        assert!(first.actor.contains('@'));

        let second: RunEvent = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.action, RunAction::Discover);
        assert_eq!(second.details["library"], "tap_demo");
    }

    #[test]
    fn actions_serialize_snake_case() {
        let event = RunEvent::new(RunAction::Clean, "x");
        let line = event.to_ndjson_line().unwrap();
        assert!(line.contains("\"action\":\"clean\""));
    }

    #[test]
    fn action_display_matches_serialization() {
        assert_eq!(RunAction::Resolve.to_string(), "resolve");
        assert_eq!(RunAction::Verify.to_string(), "verify");
    }

    #[test]
    fn record_survives_unwritable_build_root() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("does").join("not").join("exist");
        // Must not panic; the pipeline treats the log as best-effort.
        record(&missing, &RunEvent::new(RunAction::Clean, "x"));
    }
}
