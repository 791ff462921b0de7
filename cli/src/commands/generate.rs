//! Unit generation into an explicit directory: backs `manage-procs generate`
//! and the `systemd-procserv-generator-*` binaries.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::DefinitionStore as _;
use crate::application::ports::ProgressReporter as _;
use crate::application::services::unit_generator;

/// The directories systemd passes to a generator.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Output directory for generated units
    #[arg(value_name = "NORMAL_DIR")]
    pub normal_dir: PathBuf,

    /// Accepted for the generator calling convention; unused
    #[arg(value_name = "EARLY_DIR")]
    pub early_dir: Option<PathBuf>,

    /// Accepted for the generator calling convention; unused
    #[arg(value_name = "LATE_DIR")]
    pub late_dir: Option<PathBuf>,
}

/// Reconcile units for every enabled definition into `normal_dir`.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded, a unit cannot be
/// rendered, or the directory cannot be written.
pub fn run(app: &AppContext, args: &GenerateArgs) -> Result<()> {
    let definitions = app.store.load()?;
    let template = app.paths.unit_template(&app.launcher);
    let report = unit_generator::reconcile(&app.fs, &definitions, &args.normal_dir, &template)?;
    app.reporter().success(&format!(
        "Units in {}: {} written, {} unchanged, {} removed",
        args.normal_dir.display(),
        report.written.len(),
        report.unchanged.len(),
        report.removed.len()
    ));
    Ok(())
}
