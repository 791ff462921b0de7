//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`: never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};

use anyhow::Result;

use crate::domain::instance::{Definitions, InstanceDefinition};
use crate::domain::status::ProbeResult;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
///
/// Commands block until they exit; there is no timeout.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with inherited stdio and return only its exit status.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Emit a command the operator may want to run next.
    fn hint(&self, command: &str);
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Raw filesystem operations used by the generators and the lifecycle.
pub trait LocalFs {
    /// `true` if anything (including a dangling symlink) exists at `path`.
    fn exists(&self, path: &Path) -> bool;
    /// Create `path` and its parents; an existing directory is fine.
    ///
    /// # Errors
    ///
    /// Returns an error for anything other than "already exists".
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    /// Read a file, `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    fn read_if_exists(&self, path: &Path) -> Result<Option<String>>;
    /// Write through a temp file in the same directory, fsync, then rename.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails; the destination is then untouched.
    fn write_atomic(&self, path: &Path, content: &str) -> Result<()>;
    /// # Errors
    ///
    /// Returns an error if the file cannot be removed.
    fn remove_file(&self, path: &Path) -> Result<()>;
    /// Entry names in `dir`, sorted; empty when `dir` does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` exists but cannot be listed.
    fn list_dir(&self, dir: &Path) -> Result<Vec<String>>;
    /// Create `link` pointing at `target`. Returns `false` when an entry
    /// named `link` already existed and was left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the link cannot be created for another reason.
    fn symlink(&self, target: &Path, link: &Path) -> Result<bool>;
    /// Change ownership by user and group name.
    ///
    /// # Errors
    ///
    /// Returns an error if a name does not resolve or `chown` fails.
    fn chown(&self, path: &Path, user: Option<&str>, group: Option<&str>) -> Result<()>;
}

// ── Definition Store Port ─────────────────────────────────────────────────────

/// Reads and writes instance definitions in the scope's config tree.
pub trait DefinitionStore {
    /// Load and merge every config file.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::domain::ConfigError`] (wrapped) for any malformed
    /// file, invalid definition or duplicate name.
    fn load(&self) -> Result<Definitions>;
    /// The file `add` owns for `name`.
    fn definition_file(&self, name: &str) -> PathBuf;
    /// Atomically write `definition` as the only section of `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory or the file cannot be written.
    fn write(&self, definition: &InstanceDefinition, target: &Path) -> Result<()>;
    /// Config files that contain a section named `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be read or parsed.
    fn locate(&self, name: &str) -> Result<Vec<PathBuf>>;
    /// Remove `name` from every file that holds it. Returns whether anything
    /// was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be rewritten or deleted.
    fn remove(&self, name: &str) -> Result<bool>;
}

// ── Host Ports ────────────────────────────────────────────────────────────────

/// Signal-0 liveness probe.
pub trait ProcessProbe {
    fn probe(&self, pid: i32) -> ProbeResult;
}

/// Facts about the local machine.
pub trait HostInfo {
    /// # Errors
    ///
    /// Returns an error if the hostname cannot be read or is not UTF-8.
    fn hostname(&self) -> Result<String>;
}
