//! systemd unit rendering: pure functions, no I/O, no async.
//!
//! Returns the unit text. The caller is responsible for writing it to disk.

#![allow(clippy::format_push_string)]

use std::path::{Path, PathBuf};

use crate::domain::config::{Launcher, Scope};
use crate::domain::error::GenerateError;
use crate::domain::instance::{InstanceDefinition, unit_stem};

/// Continuation indent of the `ExecStart=` arguments.
const ARG_INDENT: &str = "                    ";

/// Everything a unit depends on besides the instance itself.
pub struct UnitTemplate<'a> {
    pub scope: Scope,
    pub procserv: &'a Path,
    pub log_dir: &'a Path,
    pub runtime_dir: &'a Path,
    /// Directory systemd resolves `RuntimeDirectory=` against.
    pub runtime_root: &'a Path,
    pub launcher: &'a Launcher,
}

/// Render `ioc@<name>.service` for `def`.
///
/// # Errors
///
/// Returns [`GenerateError::MissingEnvironment`] when the instance's site
/// needs a launcher that was not resolved.
pub fn render_unit(def: &InstanceDefinition, tpl: &UnitTemplate<'_>) -> Result<String, GenerateError> {
    let launcher = tpl
        .launcher
        .for_site(def.site.as_deref())
        .map_err(|variable| GenerateError::MissingEnvironment {
            instance: def.name.clone(),
            site: def.site.clone().unwrap_or_default(),
            variable: variable.to_string(),
        })?;

    let name = &def.name;
    let stem = unit_stem(name);
    let chdir = def.chdir.display().to_string();
    let instance_runtime: PathBuf = tpl.runtime_dir.join(&stem);
    let info_file = instance_runtime.join("info");

    let mut out = String::new();
    out.push_str("[Unit]\n");
    out.push_str(&format!("Description=procServ for {name}\n"));
    out.push_str("After=network.target remote-fs.target\n");
    out.push_str(&format!("ConditionPathIsDirectory={chdir}\n"));
    if let Some(host) = &def.host {
        out.push_str(&format!("ConditionHost={host}\n"));
    }

    out.push('\n');
    out.push_str("[Service]\n");
    out.push_str("Type=simple\n");
    match instance_runtime.strip_prefix(tpl.runtime_root) {
        Ok(relative) if !relative.as_os_str().is_empty() => {
            out.push_str(&format!("RuntimeDirectory={}\n", escape_specifiers(&relative.display().to_string())));
            out.push_str("RuntimeDirectoryPreserve=yes\n");
        }
        _ => {
            out.push_str(&format!(
                "ExecStartPre=/bin/mkdir -p {}\n",
                escape_specifiers(&instance_runtime.display().to_string())
            ));
        }
    }
    out.push_str(&format!("ExecStart={} \\\n", escape_specifiers(&tpl.procserv.display().to_string())));
    let mut args = vec![
        "--foreground".to_string(),
        format!("--logfile={}", tpl.log_dir.join(format!("out-{name}")).display()),
        format!("--info-file={}", info_file.display()),
        "--ignore=^C^D".to_string(),
        format!("--chdir={chdir}"),
        format!("--name={name}"),
        format!("--port={}", def.endpoint.procserv_arg()),
    ];
    if let Some(launcher) = launcher {
        args.push(launcher.display().to_string());
    }
    args.push(def.command.clone());
    let last = args.len() - 1;
    for (idx, arg) in args.iter().enumerate() {
        let cont = if idx == last { "" } else { " \\" };
        out.push_str(&format!("{ARG_INDENT}{}{cont}\n", escape_specifiers(arg)));
    }
    out.push_str(&format!("SyslogIdentifier={stem}\n"));

    if tpl.scope == Scope::System {
        out.push('\n');
        out.push_str(&format!("User={}\n", def.effective_user()));
        out.push_str(&format!("Group={}\n", def.effective_group()));
    }

    out.push('\n');
    out.push_str("[Install]\n");
    out.push_str(&format!("WantedBy={}\n", tpl.scope.install_target()));

    Ok(out)
}

/// systemd expands `%` specifiers in `ExecStart=`.
fn escape_specifiers(value: &str) -> String {
    value.replace('%', "%%")
}
