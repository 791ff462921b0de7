//! Application context: unified state passed to every command handler.
//!
//! `AppContext` is built once per invocation from the top-level flags. It owns
//! the resolved `ToolPaths`, the site launcher and the production port
//! implementations, so no command reads process globals on its own.

use std::io::IsTerminal as _;
use std::path::PathBuf;

use anyhow::Result;

use crate::application::services::lifecycle::InstanceManager;
use crate::application::services::service_manager::ServiceManager;
use crate::domain::config::{E3_REQUIRE_BIN, Launcher, PathOverrides, Scope, ToolPaths};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config_store::IniConfigStore;
use crate::infra::fs::LocalFs;
use crate::infra::host::SystemHost;
use crate::infra::paths;
use crate::infra::probe::SignalProbe;
use crate::output::{OutputContext, TerminalReporter};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    pub scope: Scope,
    pub overrides: PathOverrides,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    pub paths: ToolPaths,
    /// `ess-e3` launcher, read from the environment once.
    pub launcher: Launcher,
    pub cwd: PathBuf,
    pub store: IniConfigStore,
    pub fs: LocalFs,
    pub runner: TokioCommandRunner,
    pub host: SystemHost,
    pub probe: SignalProbe,
    /// `false` when stdin is not a terminal; confirmations are then skipped.
    pub interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool paths cannot be resolved.
    pub fn new(flags: AppFlags) -> Result<Self> {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        let paths = paths::resolve(flags.scope, flags.overrides)?;
        let store = IniConfigStore::new(paths.config_file(), paths.config_dir());

        Ok(Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            mode,
            launcher: Launcher::from_env_value(std::env::var_os(E3_REQUIRE_BIN).as_deref()),
            cwd: paths::current_dir()?,
            store,
            paths,
            fs: LocalFs,
            runner: TokioCommandRunner,
            host: SystemHost,
            probe: SignalProbe,
            interactive: std::io::stdin().is_terminal(),
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    #[must_use]
    pub fn services(&self) -> ServiceManager<'_, TokioCommandRunner> {
        ServiceManager::new(&self.runner, &self.paths.systemctl, self.paths.scope)
    }

    #[must_use]
    pub fn instances(&self) -> InstanceManager<'_, IniConfigStore, LocalFs, TokioCommandRunner, SystemHost> {
        InstanceManager {
            store: &self.store,
            fs: &self.fs,
            runner: &self.runner,
            host: &self.host,
            paths: &self.paths,
            launcher: &self.launcher,
            cwd: &self.cwd,
        }
    }

    /// Ask the operator a yes/no question, defaulting to `default`.
    ///
    /// Without a terminal on stdin the question cannot be asked and the
    /// action proceeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails.
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if !self.interactive {
            return Ok(true);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}
