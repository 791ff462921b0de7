//! JSON output helpers.

use anyhow::{Context, Result};
use procserv_common::StatusOutput;

/// Pretty-printed `status --json` document.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_status(status: &StatusOutput) -> Result<String> {
    serde_json::to_string_pretty(status).context("JSON serialization failed")
}

/// Format a JSON error object:
///
/// ```json
/// {
///   "error": true,
///   "message": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}
