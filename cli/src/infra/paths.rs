//! Resolves `ToolPaths` from the host environment.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::config::{HostDirs, PathOverrides, Scope, ToolPaths};

/// Defaults for `scope` from `dirs`, then `overrides` on top.
///
/// # Errors
///
/// Returns an error if the current directory cannot be read, or if the home
/// directory is unknown in user scope.
pub fn resolve(scope: Scope, overrides: PathOverrides) -> Result<ToolPaths> {
    let home = match (dirs::home_dir(), scope) {
        (Some(home), _) => home,
        (None, Scope::System) => PathBuf::from("/"),
        (None, Scope::User) => anyhow::bail!("cannot determine home directory"),
    };
    let runtime = dirs::runtime_dir().unwrap_or_else(std::env::temp_dir);
    let state = dirs::state_dir();
    let cwd = std::env::current_dir().context("reading current directory")?;

    let paths = ToolPaths::for_scope(
        scope,
        &HostDirs {
            home: &home,
            runtime: &runtime,
            state: state.as_deref(),
            cwd: &cwd,
        },
    )
    .with_overrides(overrides);
    tracing::debug!(?paths, "resolved tool paths");
    Ok(paths)
}

/// Current directory, for commands that resolve relative paths.
///
/// # Errors
///
/// Returns an error if the current directory cannot be read.
pub fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("reading current directory")
}
