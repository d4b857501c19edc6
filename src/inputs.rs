//! Input resolution for kiln.
//!
//! Validates the two caller-supplied paths and derives every secondary path
//! the pipeline needs. Aside from the existence checks and a sanity parse of
//! the replay file, everything here is pure path computation.

use crate::error::{KilnError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Fully resolved inputs for one pipeline run.
#[derive(Debug, Clone)]
pub struct ResolvedInputs {
    /// Absolute path to the template directory.
    pub template: PathBuf,

    /// Absolute path to the replay (answer) file.
    pub replay_file: PathBuf,

    /// Local development tree of the SDK the generated project depends on.
    /// The template lives two levels below the repository root, so this is
    /// the grandparent of the template directory.
    pub sdk_dir: PathBuf,

    /// Name of the generated project's subdirectory under the build root:
    /// the replay file's base name with its extension stripped.
    pub output_name: String,

    /// Where the generated project will be placed: `build_root/output_name`.
    pub project_dir: PathBuf,
}

/// Validate the caller-supplied paths and derive the secondary paths.
///
/// Fails with a usage error if the template path is not a directory, the
/// replay path is not a regular file, or the replay file is not valid JSON.
/// No subprocess has been spawned by the time any of these errors surface.
pub fn resolve(template: &Path, replay_file: &Path, build_root: &Path) -> Result<ResolvedInputs> {
    if !template.is_dir() {
        return Err(KilnError::Usage(format!(
            "template directory not found: {}",
            template.display()
        )));
    }

    if !replay_file.is_file() {
        return Err(KilnError::Usage(format!(
            "replay file not found: {}",
            replay_file.display()
        )));
    }

    let template = absolute(template)?;
    let replay_file = absolute(replay_file)?;

    // Replay files are JSON answer captures. Rejecting malformed JSON here
    // attributes the failure to the input rather than to a mid-render crash
    // of the template engine.
    let contents = fs::read_to_string(&replay_file).map_err(|e| {
        KilnError::Usage(format!(
            "failed to read replay file '{}': {}",
            replay_file.display(),
            e
        ))
    })?;
    serde_json::from_str::<serde_json::Value>(&contents).map_err(|e| {
        KilnError::Usage(format!(
            "replay file '{}' is not valid JSON: {}",
            replay_file.display(),
            e
        ))
    })?;

    let sdk_dir = template
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            KilnError::Usage(format!(
                "cannot derive the SDK directory: template '{}' must live two levels below the repository root",
                template.display()
            ))
        })?;

    let output_name = replay_file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            KilnError::Usage(format!(
                "cannot derive an output name from replay file '{}'",
                replay_file.display()
            ))
        })?;

    let project_dir = build_root.join(&output_name);

    Ok(ResolvedInputs {
        template,
        replay_file,
        sdk_dir,
        output_name,
        project_dir,
    })
}

/// Absolutize a path against the current directory without resolving symlinks.
fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| {
        KilnError::Usage(format!(
            "failed to resolve path '{}': {}",
            path.display(),
            e
        ))
    })
}
