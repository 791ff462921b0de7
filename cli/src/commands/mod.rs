//! Command implementations

pub mod add;
pub mod generate;
pub mod list;
pub mod remove;
pub mod status;
pub mod write_procs_cf;

use std::path::PathBuf;

use clap::Args;

use crate::application::services::lifecycle::Regenerate;
use crate::domain::config::ToolPaths;

/// Regeneration flags shared by `add` and `remove`.
#[derive(Args, Debug, Clone, Default)]
pub struct RegenArgs {
    /// Rewrite the conserver console file (default)
    #[arg(long, overrides_with = "no_writeconf")]
    pub writeconf: bool,

    /// Leave the conserver console file alone
    #[arg(long, overrides_with = "writeconf")]
    pub no_writeconf: bool,

    /// Regenerate unit files (default)
    #[arg(long, overrides_with = "no_writesysd")]
    pub writesysd: bool,

    /// Leave unit files alone
    #[arg(long, overrides_with = "writesysd")]
    pub no_writesysd: bool,

    /// Unit output directory [default: the scope's systemd unit directory]
    #[arg(long, value_name = "DIR")]
    pub outsysd: Option<PathBuf>,

    /// Restart conserver after rewriting its file
    #[arg(short = 'R', long)]
    pub reload: bool,
}

impl RegenArgs {
    #[must_use]
    pub fn resolve(self, paths: &ToolPaths) -> Regenerate {
        Regenerate {
            writeconf: !self.no_writeconf,
            writesysd: !self.no_writesysd,
            outsysd: self.outsysd.unwrap_or_else(|| paths.systemd_dir.clone()),
            reload: self.reload,
        }
    }
}
