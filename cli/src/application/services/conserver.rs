//! Console-registry publishing.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, LocalFs, ProgressReporter};
use crate::application::services::service_manager::ServiceManager;
use crate::domain::config::CONSERVER_UNIT;
use crate::domain::conserver::render_procs_cf;
use crate::domain::instance::Definitions;

/// Atomically write the conserver file for every definition.
///
/// # Errors
///
/// Returns an error if the parent directory or the file cannot be written.
pub fn write_registry(
    fs: &impl LocalFs,
    definitions: &Definitions,
    out_file: &Path,
    runtime_dir: &Path,
) -> Result<()> {
    if let Some(parent) = out_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs.create_dir_all(parent)
            .with_context(|| format!("preparing {}", parent.display()))?;
    }
    fs.write_atomic(out_file, &render_procs_cf(definitions.iter(), runtime_dir))?;
    tracing::info!(path = %out_file.display(), consoles = definitions.len(), "wrote console registry");
    Ok(())
}

/// Write the registry, then restart conserver or tell the operator to.
///
/// # Errors
///
/// Returns an error if the write fails or `systemctl restart` exits non-zero.
pub async fn publish<R: CommandRunner>(
    fs: &impl LocalFs,
    services: &ServiceManager<'_, R>,
    reporter: &impl ProgressReporter,
    definitions: &Definitions,
    out_file: &Path,
    runtime_dir: &Path,
    reload: bool,
) -> Result<()> {
    write_registry(fs, definitions, out_file, runtime_dir)?;
    reporter.success(&format!("Wrote {}", out_file.display()));
    if reload {
        reporter.step("Restarting conserver...");
        services.restart(CONSERVER_UNIT).await?;
    } else {
        reporter.hint(&format!("systemctl restart {CONSERVER_UNIT}"));
    }
    Ok(())
}
