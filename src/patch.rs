//! Dependency patching and installation of the generated project.
//!
//! The generated manifest declares a published version of the SDK under
//! development; verification must run against the local tree instead. The
//! manifest is parsed as a TOML document, the one dependency entry is replaced
//! by key, and the document is re-serialized. Nothing is written unless the
//! entry was found, so a patch failure leaves the project untouched. The
//! pre-patch bytes are kept as `pyproject.toml.bak` for diffing.

use crate::config::Config;
use crate::error::{KilnError, Result};
use crate::proc;
use std::fs;
use std::path::Path;

/// Manifest file at the root of the generated project.
pub const MANIFEST_FILE: &str = "pyproject.toml";

/// Rewrite the self-referential dependency to a local editable path.
pub fn patch_manifest(project_dir: &Path, package: &str, sdk_dir: &Path) -> Result<()> {
    let manifest_path = project_dir.join(MANIFEST_FILE);

    let raw = fs::read_to_string(&manifest_path).map_err(|e| {
        KilnError::Patch(format!(
            "failed to read manifest '{}': {}",
            manifest_path.display(),
            e
        ))
    })?;

    let mut doc: toml::Value = raw.parse().map_err(|e| {
        KilnError::Patch(format!(
            "manifest '{}' is not valid TOML: {}",
            manifest_path.display(),
            e
        ))
    })?;

    let deps = doc
        .get_mut("tool")
        .and_then(|v| v.get_mut("poetry"))
        .and_then(|v| v.get_mut("dependencies"))
        .and_then(|v| v.as_table_mut())
        .ok_or_else(|| {
            KilnError::Patch(format!(
                "manifest '{}' has no [tool.poetry.dependencies] table",
                manifest_path.display()
            ))
        })?;

    if !deps.contains_key(package) {
        return Err(KilnError::Patch(format!(
            "manifest '{}' declares no '{}' dependency to repoint",
            manifest_path.display(),
            package
        )));
    }

    let mut local = toml::value::Table::new();
    local.insert(
        "path".to_string(),
        toml::Value::String(sdk_dir.display().to_string()),
    );
    local.insert("develop".to_string(), toml::Value::Boolean(true));
    deps.insert(package.to_string(), toml::Value::Table(local));

    let patched = toml::to_string(&doc).map_err(|e| {
        KilnError::Patch(format!(
            "failed to re-serialize manifest '{}': {}",
            manifest_path.display(),
            e
        ))
    })?;

    // Keep the original for diffing, mirroring the engine-side convention of
    // leaving a .bak next to in-place edits.
    let backup_path = project_dir.join(format!("{}.bak", MANIFEST_FILE));
    fs::write(&backup_path, &raw).map_err(|e| {
        KilnError::Patch(format!(
            "failed to write manifest backup '{}': {}",
            backup_path.display(),
            e
        ))
    })?;

    fs::write(&manifest_path, patched).map_err(|e| {
        KilnError::Patch(format!(
            "failed to write patched manifest '{}': {}",
            manifest_path.display(),
            e
        ))
    })?;

    Ok(())
}

/// Reconcile the lockfile with the patched manifest, then install the project
/// into its isolated environment.
pub fn lock_and_install(config: &Config, project_dir: &Path) -> Result<()> {
    for subcommand in ["lock", "install"] {
        let args = vec![subcommand.to_string()];
        let status = proc::run_tool(&config.package_manager, &args, project_dir)
            .map_err(KilnError::Install)?;

        if !status.success() {
            return Err(KilnError::Install(format!(
                "{} {} exited with status {} in '{}'",
                config.package_manager,
                subcommand,
                proc::exit_code(status),
                project_dir.display()
            )));
        }
    }

    Ok(())
}
