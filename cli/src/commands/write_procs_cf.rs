//! `manage-procs write-procs-cf`: regenerate the conserver console file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::DefinitionStore as _;
use crate::application::services::conserver;

/// Arguments for the write-procs-cf command.
#[derive(Args, Debug, Clone)]
pub struct WriteProcsCfArgs {
    /// Output file [default: the configured conserver file]
    #[arg(short = 'o', long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Restart conserver after writing
    #[arg(short = 'R', long)]
    pub reload: bool,
}

/// Run `manage-procs write-procs-cf`.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded, the file cannot be
/// written, or the conserver restart fails.
pub async fn run(app: &AppContext, args: &WriteProcsCfArgs) -> Result<()> {
    let definitions = app.store.load()?;
    let out = args.out.as_ref().unwrap_or(&app.paths.conserver_conf);
    conserver::publish(
        &app.fs,
        &app.services(),
        &app.reporter(),
        &definitions,
        out,
        &app.paths.runtime_dir,
        args.reload,
    )
    .await
}
