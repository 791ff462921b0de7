//! `manage-procs add`: define a new instance.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::lifecycle::AddRequest;
use crate::commands::RegenArgs;

/// Arguments for the add command.
#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Instance name, e.g. `ioc1`
    pub name: String,

    /// Working directory [default: current directory]
    #[arg(short = 'C', long, value_name = "DIR")]
    pub chdir: Option<PathBuf>,

    /// Console endpoint: `tcp:<port>`, `<port>` or `unix:<path>`
    #[arg(short = 'P', long)]
    pub port: Option<String>,

    /// User the instance runs as (system scope)
    #[arg(short = 'U', long)]
    pub username: Option<String>,

    /// Group the instance runs as (system scope)
    #[arg(short = 'G', long)]
    pub group: Option<String>,

    /// Only start on this host
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Site profile to apply, e.g. `ess-e3`
    #[arg(long)]
    pub site: Option<String>,

    /// Overwrite an existing definition
    #[arg(short, long)]
    pub force: bool,

    /// Start the instance after adding it
    #[arg(short = 'A', long)]
    pub autostart: bool,

    #[command(flatten)]
    pub regen: RegenArgs,

    /// Command to run, relative to the working directory
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Run `manage-procs add`.
///
/// # Errors
///
/// Returns an error if the instance already exists (without `--force`), the
/// definition is invalid, or regeneration fails.
pub async fn run(app: &AppContext, args: AddArgs) -> Result<()> {
    let AddArgs {
        name,
        chdir,
        port,
        username,
        group,
        host,
        site,
        force,
        autostart,
        regen,
        command,
    } = args;
    let req = AddRequest {
        name,
        chdir,
        command,
        port,
        user: username,
        group,
        host,
        site,
        force,
        autostart,
        regenerate: regen.resolve(&app.paths),
    };
    let reporter = app.reporter();
    let definition = app.instances().add(&req, &reporter).await?;
    tracing::info!(name = %definition.name, endpoint = %definition.endpoint, "added instance");
    Ok(())
}
