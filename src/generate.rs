//! Scaffold generation: drives the template engine.
//!
//! The engine is invoked non-interactively; every answer comes from the replay
//! file. Any engine error (malformed template, missing answer keys, output
//! collision) is fatal to the run with no retry.

use crate::config::Config;
use crate::error::{KilnError, Result};
use crate::inputs::ResolvedInputs;
use crate::proc;

/// Render the template into `build_root`, creating the generated project.
///
/// The stale-output cleaner has already guaranteed the target directory does
/// not exist and that the build root does.
pub fn render_scaffold(config: &Config, inputs: &ResolvedInputs) -> Result<()> {
    let args = vec![
        "--replay-file".to_string(),
        inputs.replay_file.display().to_string(),
        inputs.template.display().to_string(),
        "-o".to_string(),
        config.build_root.display().to_string(),
    ];

    let status = proc::run_tool(&config.engine_command, &args, &config.build_root)
        .map_err(KilnError::Generation)?;

    if !status.success() {
        return Err(KilnError::Generation(format!(
            "{} exited with status {} rendering template '{}'",
            config.engine_command,
            proc::exit_code(status),
            inputs.template.display()
        )));
    }

    // The engine's success claim is not enough: the rest of the pipeline
    // needs the project directory to actually exist.
    if !inputs.project_dir.is_dir() {
        return Err(KilnError::Generation(format!(
            "{} reported success but '{}' was not created",
            config.engine_command,
            inputs.project_dir.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use crate::inputs;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Write an executable fake engine script that records its arguments and
    /// creates the directories listed in `creates`.
    fn fake_engine(dir: &Path, creates: &[PathBuf], exit: i32) -> String {
        let mkdirs: String = creates
            .iter()
            .map(|p| format!("mkdir -p '{}'\n", p.display()))
            .collect();
        let script = dir.join("fake-cookiecutter");
        fs::write(
            &script,
            format!(
                "#!/bin/sh\necho \"$@\" > '{}'\n{}exit {}\n",
                dir.join("engine-args.txt").display(),
                mkdirs,
                exit
            ),
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script.display().to_string()
    }

    fn fixture(temp: &TempDir) -> (Config, crate::inputs::ResolvedInputs) {
        let template = temp.path().join("repo").join("cookiecutter").join("tap-template");
        fs::create_dir_all(&template).unwrap();
        let replay = temp.path().join("tap-demo.json");
        fs::write(&replay, "{}").unwrap();

        let build_root = temp.path().join("build");
        fs::create_dir_all(&build_root).unwrap();

        let config = Config {
            build_root: build_root.clone(),
            ..Config::default()
        };
        let resolved = inputs::resolve(&template, &replay, &build_root).unwrap();
        (config, resolved)
    }

    #[test]
    fn render_passes_replay_template_and_output_root() {
        let temp = TempDir::new().unwrap();
        let (mut config, resolved) = fixture(&temp);
        config.engine_command =
            fake_engine(temp.path(), &[resolved.project_dir.clone()], 0);

        render_scaffold(&config, &resolved).unwrap();

        let recorded = fs::read_to_string(temp.path().join("engine-args.txt")).unwrap();
        assert!(recorded.contains("--replay-file"));
        assert!(recorded.contains(&resolved.replay_file.display().to_string()));
        assert!(recorded.contains(&resolved.template.display().to_string()));
        assert!(recorded.contains(&format!("-o {}", config.build_root.display())));
    }

    #[test]
    fn render_maps_engine_failure_to_generation_error() {
        let temp = TempDir::new().unwrap();
        let (mut config, resolved) = fixture(&temp);
        config.engine_command = fake_engine(temp.path(), &[], 2);

        let err = render_scaffold(&config, &resolved).unwrap_err();
        assert!(matches!(err, KilnError::Generation(_)));
        assert!(err.to_string().contains("status 2"));
    }

    #[test]
    fn render_fails_when_project_dir_missing_despite_success() {
        let temp = TempDir::new().unwrap();
        let (mut config, resolved) = fixture(&temp);
        // Exits zero but never creates the project directory.
        config.engine_command = fake_engine(temp.path(), &[], 0);

        let err = render_scaffold(&config, &resolved).unwrap_err();
        assert!(matches!(err, KilnError::Generation(_)));
        assert!(err.to_string().contains("was not created"));
    }

    #[test]
    fn render_fails_when_engine_is_missing() {
        let temp = TempDir::new().unwrap();
        let (mut config, resolved) = fixture(&temp);
        config.engine_command = "kiln-no-such-engine".to_string();

        let err = render_scaffold(&config, &resolved).unwrap_err();
        assert!(matches!(err, KilnError::Generation(_)));
        assert!(err.to_string().contains("PATH"));
    }
}
