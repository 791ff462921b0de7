//! Unit file reconciliation.
//!
//! Converges an output directory (and its `*.target.wants` directory) on
//! exactly one `ioc@<name>.service` per enabled definition. Repeated runs
//! over the same definitions are no-ops.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::LocalFs;
use crate::domain::instance::{Definitions, instance_of_unit_file};
use crate::domain::units::{UnitTemplate, render_unit};

/// What a reconcile pass changed, by unit file name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub written: Vec<String>,
    pub unchanged: Vec<String>,
    /// Stale unit files and wants entries that were deleted.
    pub removed: Vec<String>,
    pub linked: Vec<String>,
}

/// Reconcile `out_dir` against the enabled definitions.
///
/// Every unit is rendered before anything is written, so a rendering failure
/// leaves the directory untouched.
///
/// # Errors
///
/// Returns a [`crate::domain::GenerateError`] (wrapped) when a unit cannot be
/// rendered, or a filesystem error with the offending path.
pub fn reconcile(
    fs: &impl LocalFs,
    definitions: &Definitions,
    out_dir: &Path,
    template: &UnitTemplate<'_>,
) -> Result<ReconcileReport> {
    let rendered = definitions
        .enabled()
        .map(|def| -> Result<(String, String)> {
            Ok((def.unit_name(), render_unit(def, template)?))
        })
        .collect::<Result<Vec<_>>>()?;

    fs.create_dir_all(out_dir)
        .with_context(|| format!("preparing unit directory {}", out_dir.display()))?;

    let mut report = ReconcileReport::default();
    for (unit, text) in &rendered {
        let path = out_dir.join(unit);
        if fs.read_if_exists(&path)?.as_deref() == Some(text.as_str()) {
            tracing::debug!(%unit, "unit unchanged");
            report.unchanged.push(unit.clone());
            continue;
        }
        fs.write_atomic(&path, text)?;
        tracing::info!(path = %path.display(), "wrote unit");
        report.written.push(unit.clone());
    }

    let keep: BTreeSet<&str> = rendered.iter().map(|(unit, _)| unit.as_str()).collect();
    let wants_dir = out_dir.join(template.scope.wants_dir_name());
    for dir in [out_dir, wants_dir.as_path()] {
        for entry in fs.list_dir(dir)? {
            if instance_of_unit_file(&entry).is_none() || keep.contains(entry.as_str()) {
                continue;
            }
            let path = dir.join(&entry);
            fs.remove_file(&path)?;
            tracing::info!(path = %path.display(), "removed stale unit");
            report.removed.push(entry);
        }
    }

    fs.create_dir_all(&wants_dir)
        .with_context(|| format!("preparing {}", wants_dir.display()))?;
    for (unit, _) in &rendered {
        if fs.symlink(&out_dir.join(unit), &wants_dir.join(unit))? {
            report.linked.push(unit.clone());
        }
    }

    Ok(report)
}
