//! `manage-procs status`: state of every enabled instance.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::DefinitionStore as _;
use crate::application::services::status;
use crate::output::{HumanRenderer, json};

/// Run `manage-procs status`.
///
/// # Errors
///
/// Returns an error if the config store cannot be loaded.
pub fn run(app: &AppContext) -> Result<()> {
    let definitions = app.store.load()?;
    let report = status::report(&app.fs, &app.probe, &definitions, &app.paths.runtime_dir);
    if app.is_json() {
        println!("{}", json::format_status(&report)?);
    } else {
        HumanRenderer::new(&app.output).render_status(&report);
    }
    Ok(())
}
