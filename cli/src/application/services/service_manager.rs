//! `systemctl` adapter for one scope.

use std::path::Path;
use std::process::Output;

use anyhow::Result;

use crate::application::ports::CommandRunner;
use crate::domain::config::Scope;
use crate::domain::error::ExternalCommandError;

/// Typed wrapper over `systemctl --user|--system`.
pub struct ServiceManager<'a, R: CommandRunner> {
    runner: &'a R,
    systemctl: &'a Path,
    scope: Scope,
}

impl<'a, R: CommandRunner> ServiceManager<'a, R> {
    #[must_use]
    pub fn new(runner: &'a R, systemctl: &'a Path, scope: Scope) -> Self {
        Self {
            runner,
            systemctl,
            scope,
        }
    }

    /// # Errors
    ///
    /// Returns [`ExternalCommandError`] on a non-zero exit.
    pub async fn daemon_reload(&self) -> Result<()> {
        self.checked(&["daemon-reload"]).await
    }

    /// # Errors
    ///
    /// Returns [`ExternalCommandError`] on a non-zero exit.
    pub async fn start(&self, unit: &str) -> Result<()> {
        self.checked(&["start", unit]).await
    }

    /// # Errors
    ///
    /// Returns [`ExternalCommandError`] on a non-zero exit.
    pub async fn restart(&self, unit: &str) -> Result<()> {
        self.checked(&["restart", unit]).await
    }

    /// `list-units <pattern>` straight to the terminal.
    ///
    /// # Errors
    ///
    /// Returns [`ExternalCommandError`] on a non-zero exit.
    pub async fn list_units(&self, pattern: &str) -> Result<()> {
        let args = [self.scope.systemctl_flag(), "list-units", pattern];
        let program = self.program();
        let status = self.runner.run_status(&program, &args).await?;
        if status.success() {
            return Ok(());
        }
        Err(ExternalCommandError {
            command: describe(&program, &args),
            status: status.to_string(),
            stderr: String::new(),
        }
        .into())
    }

    async fn checked(&self, verb: &[&str]) -> Result<()> {
        let mut args = vec![self.scope.systemctl_flag()];
        args.extend_from_slice(verb);
        let program = self.program();
        tracing::debug!(command = %describe(&program, &args), "running service manager");
        let output: Output = self.runner.run(&program, &args).await?;
        if output.status.success() {
            return Ok(());
        }
        Err(ExternalCommandError {
            command: describe(&program, &args),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
        .into())
    }

    fn program(&self) -> String {
        self.systemctl.to_string_lossy().into_owned()
    }
}

fn describe(program: &str, args: &[&str]) -> String {
    let mut parts = vec![program];
    parts.extend_from_slice(args);
    parts.join(" ")
}
