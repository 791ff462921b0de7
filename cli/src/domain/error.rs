//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while loading or validating instance definitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{}:{line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Instance '{instance}' is missing required option '{option}'")]
    MissingOption { instance: String, option: String },

    #[error("Instance '{instance}': invalid value for '{option}': '{value}' ({reason})")]
    InvalidValue {
        instance: String,
        option: String,
        value: String,
        reason: String,
    },

    #[error("Invalid instance name '{0}': must match ^[A-Za-z0-9_][A-Za-z0-9_.:-]*$ (max 128 chars)")]
    InvalidName(String),

    #[error("Instance '{name}' is defined in both {} and {}", .first.display(), .second.display())]
    DuplicateInstance {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

// ── Instance errors ───────────────────────────────────────────────────────────

/// Errors related to adding or removing a single instance.
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("Instance '{name}' already exists @ {}. Use -f (--force) to overwrite.", .path.display())]
    AlreadyExists { name: String, path: PathBuf },
}

// ── Generation errors ─────────────────────────────────────────────────────────

/// Errors raised while rendering generated artifacts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error(
        "Instance '{instance}' uses site '{site}' which needs ${variable}. Source the site environment (e.g. setE3Env.bash) and rerun."
    )]
    MissingEnvironment {
        instance: String,
        site: String,
        variable: String,
    },
}

// ── Site profile errors ───────────────────────────────────────────────────────

/// Errors reading a site profile. Reported as warnings, never fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SiteProfileError {
    #[error("No site config file for '{site}' at {}", .path.display())]
    NotFound { site: String, path: PathBuf },

    #[error("Site config for '{site}' has no [{site}] section")]
    MissingSection { site: String },

    #[error("Site config for '{site}' is missing key '{key}'")]
    MissingKey { site: String, key: String },

    #[error("Site config for '{site}' is malformed: {message}")]
    Malformed { site: String, message: String },
}

// ── External command errors ───────────────────────────────────────────────────

/// A service-manager or multiplexer command exited unsuccessfully.
#[derive(Debug, Error)]
#[error("`{command}` failed ({status}){}", stderr_suffix(.stderr))]
pub struct ExternalCommandError {
    pub command: String,
    pub status: String,
    pub stderr: String,
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}
