//! `manage-procs list`: instance units as the service manager sees them.

use anyhow::Result;

use crate::app::AppContext;

/// Unit pattern matching every generated instance.
pub const UNIT_PATTERN: &str = "ioc@*";

/// Run `manage-procs list`.
///
/// # Errors
///
/// Returns an error if `systemctl list-units` cannot run or exits non-zero.
pub async fn run(app: &AppContext) -> Result<()> {
    app.services().list_units(UNIT_PATTERN).await
}
