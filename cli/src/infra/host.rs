//! Host facts from the operating system.

use anyhow::{Context, Result};

use crate::application::ports::HostInfo;

pub struct SystemHost;

impl HostInfo for SystemHost {
    fn hostname(&self) -> Result<String> {
        nix::unistd::gethostname()
            .context("reading hostname")?
            .into_string()
            .map_err(|raw| anyhow::anyhow!("hostname is not UTF-8: {}", raw.to_string_lossy()))
    }
}

/// `true` when running with effective uid 0.
#[must_use]
pub fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}
