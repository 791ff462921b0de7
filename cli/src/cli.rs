//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;
use crate::domain::config::{PathOverrides, Scope};
use crate::infra::{host, logging};

/// Manage procServ instances under systemd and conserver
#[derive(Parser)]
#[command(
    name = "manage-procs",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Act on the per-user service manager and config (default unless root)
    #[arg(long, global = true, conflicts_with = "system")]
    pub user: bool,

    /// Act on the system service manager and /etc config (default as root)
    #[arg(long, global = true)]
    pub system: bool,

    /// More diagnostics on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output (also when NO_COLOR is set)
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(flatten)]
    pub paths: PathArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Overrides for the scope's default file locations.
#[derive(Args, Debug, Clone, Default)]
pub struct PathArgs {
    /// Directory holding procServ.conf and procServ.d/
    #[arg(long, global = true, env = "PROCSERV_CONFIG_DIR", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Directory holding per-instance runtime directories
    #[arg(long, global = true, env = "PROCSERV_RUNTIME_DIR", value_name = "DIR")]
    pub runtime_dir: Option<PathBuf>,

    /// Directory procServ writes instance logs to
    #[arg(long, global = true, env = "PROCSERV_LOG_DIR", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// systemctl executable
    #[arg(long, global = true, env = "PROCSERV_SYSTEMCTL", value_name = "PATH")]
    pub systemctl: Option<PathBuf>,

    /// procServ executable written into units
    #[arg(long, global = true, env = "PROCSERV_BIN", value_name = "PATH")]
    pub procserv: Option<PathBuf>,

    /// conserver console file
    #[arg(long, global = true, env = "PROCSERV_CONSERVER_CONF", value_name = "FILE")]
    pub conserver_conf: Option<PathBuf>,

    /// Directory holding <site>.conf profiles
    #[arg(long, global = true, env = "PROCSERV_SITE_DIR", value_name = "DIR")]
    pub site_dir: Option<PathBuf>,
}

impl From<PathArgs> for PathOverrides {
    fn from(args: PathArgs) -> Self {
        Self {
            config_dir: args.config_dir,
            runtime_dir: args.runtime_dir,
            log_dir: args.log_dir,
            systemctl: args.systemctl,
            procserv: args.procserv,
            conserver_conf: args.conserver_conf,
            site_dir: args.site_dir,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Report the state of every enabled instance
    Status,

    /// List instance units known to the service manager
    List,

    /// Define a new instance
    Add(commands::add::AddArgs),

    /// Remove an instance definition
    Remove(commands::remove::RemoveArgs),

    /// Write the conserver console file
    #[command(name = "write-procs-cf")]
    WriteProcsCf(commands::write_procs_cf::WriteProcsCfArgs),

    /// Generate unit files into a directory (systemd generator entry point)
    #[command(hide = true)]
    Generate(commands::generate::GenerateArgs),
}

/// Scope from the flags, falling back to the effective uid.
#[must_use]
pub fn select_scope(user: bool, system: bool, is_root: bool) -> Scope {
    match (user, system) {
        (true, _) => Scope::User,
        (_, true) => Scope::System,
        _ if is_root => Scope::System,
        _ => Scope::User,
    }
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            user,
            system,
            verbose,
            json,
            quiet,
            no_color,
            paths,
            command,
        } = self;
        logging::init(verbose);

        let scope = select_scope(user, system, host::is_root());
        tracing::debug!(?scope, "selected scope");
        let app = AppContext::new(AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            scope,
            overrides: paths.into(),
        })?;

        match command {
            Command::Status => commands::status::run(&app),
            Command::List => commands::list::run(&app).await,
            Command::Add(args) => commands::add::run(&app, args).await,
            Command::Remove(args) => commands::remove::run(&app, args).await,
            Command::WriteProcsCf(args) => commands::write_procs_cf::run(&app, &args).await,
            Command::Generate(args) => commands::generate::run(&app, &args),
        }
    }
}
