//! Status reporting for enabled instances.

use std::path::Path;

use procserv_common::{InstanceState, StatusLine, StatusOutput};

use crate::application::ports::{LocalFs, ProcessProbe};
use crate::domain::instance::{Definitions, unit_stem};
use crate::domain::status::{RuntimeInfo, classify};

/// Name of procServ's info file inside the instance runtime directory.
pub const INFO_FILE_NAME: &str = "info";

/// Classify every enabled instance from its runtime info file.
///
/// An unreadable info file counts as absent.
pub fn report(
    fs: &impl LocalFs,
    probe: &impl ProcessProbe,
    definitions: &Definitions,
    runtime_dir: &Path,
) -> StatusOutput {
    let instances = definitions
        .enabled()
        .map(|def| {
            let path = runtime_dir.join(unit_stem(&def.name)).join(INFO_FILE_NAME);
            let info = match fs.read_if_exists(&path) {
                Ok(text) => text.map(|t| RuntimeInfo::parse(&t)),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %format!("{e:#}"), "cannot read info file");
                    None
                }
            };
            let state = classify(info.as_ref(), |pid| probe.probe(pid));
            tracing::debug!(name = %def.name, ?state, "classified");
            let endpoints = match (state, info) {
                (InstanceState::Running, Some(info)) => info.endpoints,
                _ => Vec::new(),
            };
            StatusLine {
                name: def.name.clone(),
                state,
                endpoints,
            }
        })
        .collect();
    StatusOutput { instances }
}
