//! Entry point shared by the `systemd-procserv-generator-{system,user}`
//! binaries.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::cli::PathArgs;
use crate::commands::generate::{self, GenerateArgs};
use crate::domain::config::Scope;
use crate::infra::logging;

/// systemd generator: writes procServ instance units into NORMAL_DIR
#[derive(Parser)]
#[command(version)]
pub struct GeneratorCli {
    #[command(flatten)]
    pub dirs: GenerateArgs,

    #[command(flatten)]
    pub paths: PathArgs,
}

/// Parse the generator arguments and reconcile units for `scope`.
#[must_use]
pub fn main(scope: Scope) -> ExitCode {
    let cli = GeneratorCli::parse();
    logging::init(0);
    match run(scope, cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(scope: Scope, cli: GeneratorCli) -> Result<()> {
    let app = AppContext::new(AppFlags {
        output: OutputFlags {
            no_color: true,
            quiet: true,
            json: false,
        },
        scope,
        overrides: cli.paths.into(),
    })?;
    generate::run(&app, &cli.dirs)
}
