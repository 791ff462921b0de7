//! Site profiles: per-site defaults read from `<site_dir>/<site>.conf`.
//!
//! Pure functions only: no I/O.

use std::path::{Path, PathBuf};

use crate::domain::error::SiteProfileError;
use crate::domain::ini::IniDocument;
use crate::domain::instance::{SITE_ESS_E3, unit_stem};

/// Whatever could be read from a site profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteProfile {
    pub user: Option<String>,
    pub group: Option<String>,
    /// `None` means "use this machine's hostname".
    pub host: Option<String>,
    pub base_dir: Option<PathBuf>,
}

/// Parse the `[<site>]` section of a profile.
///
/// Missing keys do not stop parsing: the keys that were found are returned
/// together with one error per problem, so callers can warn and carry on.
#[must_use]
pub fn parse_site_profile(site: &str, text: &str) -> (SiteProfile, Vec<SiteProfileError>) {
    let doc = match IniDocument::parse(text) {
        Ok(doc) => doc,
        Err(e) => {
            return (
                SiteProfile::default(),
                vec![SiteProfileError::Malformed {
                    site: site.to_string(),
                    message: format!("line {}: {}", e.line, e.message),
                }],
            );
        }
    };
    let Some(section) = doc.section(site) else {
        return (
            SiteProfile::default(),
            vec![SiteProfileError::MissingSection {
                site: site.to_string(),
            }],
        );
    };

    let get = |key: &str| doc.lookup(section, key).map(str::trim).filter(|v| !v.is_empty());
    let mut errors = Vec::new();
    let mut required = |key: &str| {
        let value = get(key).map(String::from);
        if value.is_none() {
            errors.push(SiteProfileError::MissingKey {
                site: site.to_string(),
                key: key.to_string(),
            });
        }
        value
    };

    let user = required("user");
    let group = required("group");
    let base_dir = if site == SITE_ESS_E3 {
        required("base_dir").map(PathBuf::from)
    } else {
        get("base_dir").map(PathBuf::from)
    };
    let profile = SiteProfile {
        user,
        group,
        host: get("host").map(String::from),
        base_dir,
    };
    (profile, errors)
}

/// Instance layout the `ess-e3` site imposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLayout {
    pub chdir: PathBuf,
    pub command: String,
    /// `port` option value.
    pub port: String,
    /// Runtime directory to provision for the control socket.
    pub runtime_dir: PathBuf,
}

/// `ess-e3`: `<base_dir>/<name>`, `st.<name>.cmd`, control socket under the
/// runtime directory.
#[must_use]
pub fn ess_e3_layout(name: &str, base_dir: &Path, runtime_dir: &Path) -> SiteLayout {
    let instance_runtime = runtime_dir.join(unit_stem(name));
    SiteLayout {
        chdir: base_dir.join(name),
        command: format!("st.{name}.cmd"),
        port: format!("unix:{}", instance_runtime.join("control").display()),
        runtime_dir: instance_runtime,
    }
}
