//! `manage-procs remove`: delete an instance definition.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::lifecycle::{RemoveOutcome, RemoveRequest};
use crate::commands::RegenArgs;

/// Arguments for the remove command.
#[derive(Args, Debug, Clone)]
pub struct RemoveArgs {
    /// Instance name
    pub name: String,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub force: bool,

    #[command(flatten)]
    pub regen: RegenArgs,
}

/// Run `manage-procs remove`.
///
/// # Errors
///
/// Returns an error if the config store cannot be rewritten or regeneration
/// fails.
pub async fn run(app: &AppContext, args: RemoveArgs) -> Result<()> {
    let req = RemoveRequest {
        name: args.name,
        force: args.force,
        regenerate: args.regen.resolve(&app.paths),
    };
    let reporter = app.reporter();
    let outcome = app
        .instances()
        .remove(&req, |prompt| app.confirm(prompt, false), &reporter)
        .await?;
    match outcome {
        RemoveOutcome::Removed => {}
        RemoveOutcome::NotFound => tracing::info!(name = %req.name, "not defined, nothing removed"),
        RemoveOutcome::Cancelled => println!("Cancelled."),
    }
    Ok(())
}
