//! Tool configuration: scope, file locations and the site launcher.
//!
//! Pure functions only: no I/O, no async, no filesystem access. Home and
//! runtime directories are resolved by the caller and passed in.

use std::path::{Path, PathBuf};

use crate::domain::instance::SITE_ESS_E3;
use crate::domain::units::UnitTemplate;

// ── Scope ────────────────────────────────────────────────────────────────────

/// Which service manager instance and which config tree to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    User,
    System,
}

impl Scope {
    /// Flag passed to `systemctl`.
    #[must_use]
    pub fn systemctl_flag(self) -> &'static str {
        match self {
            Self::User => "--user",
            Self::System => "--system",
        }
    }

    /// Target generated units are installed into.
    #[must_use]
    pub fn install_target(self) -> &'static str {
        match self {
            Self::User => "default.target",
            Self::System => "multi-user.target",
        }
    }

    /// Name of the enablement directory next to the unit files.
    #[must_use]
    pub fn wants_dir_name(self) -> String {
        format!("{}.wants", self.install_target())
    }
}

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_SYSTEMCTL: &str = "/bin/systemctl";
pub const DEFAULT_PROCSERV: &str = "/usr/bin/procServ";
pub const DEFAULT_CONSERVER_CONF: &str = "/etc/conserver/procs.cf";
pub const CONFIG_FILE_NAME: &str = "procServ.conf";
pub const CONFIG_DIR_NAME: &str = "procServ.d";
pub const CONSERVER_UNIT: &str = "conserver";

/// Host-side locations the tool reads from and writes to.
///
/// Built once per invocation and handed to every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub scope: Scope,
    /// Directory holding `procServ.conf` and `procServ.d/`.
    pub config_base: PathBuf,
    /// Per-instance runtime directories (`ioc@<name>/info`, `/control`).
    pub runtime_dir: PathBuf,
    /// Root of the service manager's `RuntimeDirectory=` (`/run` or
    /// `$XDG_RUNTIME_DIR`).
    pub runtime_root: PathBuf,
    pub log_dir: PathBuf,
    pub systemd_dir: PathBuf,
    pub systemctl: PathBuf,
    pub procserv: PathBuf,
    pub conserver_conf: PathBuf,
    /// Directory holding `<site>.conf` profiles.
    pub site_dir: PathBuf,
}

/// Directories the defaults are derived from.
pub struct HostDirs<'a> {
    pub home: &'a Path,
    /// `$XDG_RUNTIME_DIR`, or a fallback chosen by the caller.
    pub runtime: &'a Path,
    /// `$XDG_STATE_HOME` or its default.
    pub state: Option<&'a Path>,
    pub cwd: &'a Path,
}

impl ToolPaths {
    /// Defaults for `scope`.
    #[must_use]
    pub fn for_scope(scope: Scope, dirs: &HostDirs<'_>) -> Self {
        let site_dir = dirs.cwd.join("conf");
        match scope {
            Scope::System => Self {
                scope,
                config_base: PathBuf::from("/etc"),
                runtime_dir: PathBuf::from("/run/procServ"),
                runtime_root: PathBuf::from("/run"),
                log_dir: PathBuf::from("/var/log/procServ"),
                systemd_dir: PathBuf::from("/etc/systemd/system"),
                systemctl: PathBuf::from(DEFAULT_SYSTEMCTL),
                procserv: PathBuf::from(DEFAULT_PROCSERV),
                conserver_conf: PathBuf::from(DEFAULT_CONSERVER_CONF),
                site_dir,
            },
            Scope::User => {
                let config = dirs.home.join(".config");
                let state = dirs
                    .state
                    .map_or_else(|| dirs.home.join(".local").join("state"), Path::to_path_buf);
                Self {
                    scope,
                    systemd_dir: config.join("systemd").join("user"),
                    config_base: config,
                    runtime_dir: dirs.runtime.join("procServ"),
                    runtime_root: dirs.runtime.to_path_buf(),
                    log_dir: state.join("procServ"),
                    systemctl: PathBuf::from(DEFAULT_SYSTEMCTL),
                    procserv: PathBuf::from(DEFAULT_PROCSERV),
                    conserver_conf: PathBuf::from(DEFAULT_CONSERVER_CONF),
                    site_dir,
                }
            }
        }
    }

    /// `<base>/procServ.conf`
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config_base.join(CONFIG_FILE_NAME)
    }

    /// `<base>/procServ.d`, where `add` writes one file per instance.
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_base.join(CONFIG_DIR_NAME)
    }

    /// Unit rendering inputs for this scope.
    #[must_use]
    pub fn unit_template<'a>(&'a self, launcher: &'a Launcher) -> UnitTemplate<'a> {
        UnitTemplate {
            scope: self.scope,
            procserv: &self.procserv,
            log_dir: &self.log_dir,
            runtime_dir: &self.runtime_dir,
            runtime_root: &self.runtime_root,
            launcher,
        }
    }

    #[must_use]
    pub fn site_profile(&self, site: &str) -> PathBuf {
        self.site_dir.join(format!("{site}.conf"))
    }
}

/// Explicit per-invocation replacements for [`ToolPaths`] defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathOverrides {
    pub config_dir: Option<PathBuf>,
    pub runtime_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub systemctl: Option<PathBuf>,
    pub procserv: Option<PathBuf>,
    pub conserver_conf: Option<PathBuf>,
    pub site_dir: Option<PathBuf>,
}

impl ToolPaths {
    /// Replace every default that has an override.
    #[must_use]
    pub fn with_overrides(mut self, overrides: PathOverrides) -> Self {
        let PathOverrides {
            config_dir,
            runtime_dir,
            log_dir,
            systemctl,
            procserv,
            conserver_conf,
            site_dir,
        } = overrides;
        let replace = |slot: &mut PathBuf, value: Option<PathBuf>| {
            if let Some(value) = value {
                *slot = value;
            }
        };
        replace(&mut self.config_base, config_dir);
        replace(&mut self.runtime_dir, runtime_dir);
        replace(&mut self.log_dir, log_dir);
        replace(&mut self.systemctl, systemctl);
        replace(&mut self.procserv, procserv);
        replace(&mut self.conserver_conf, conserver_conf);
        replace(&mut self.site_dir, site_dir);
        self
    }
}

// ── Site launcher ────────────────────────────────────────────────────────────

/// Environment variable naming the `ess-e3` launcher directory.
pub const E3_REQUIRE_BIN: &str = "E3_REQUIRE_BIN";
const E3_LAUNCHER_SCRIPT: &str = "iocsh.bash";

/// The `ess-e3` launcher, resolved once at the command boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launcher {
    /// `$E3_REQUIRE_BIN` was set to this directory.
    Resolved(PathBuf),
    Unavailable,
}

impl Launcher {
    /// Build from the raw value of [`E3_REQUIRE_BIN`].
    #[must_use]
    pub fn from_env_value(value: Option<&std::ffi::OsStr>) -> Self {
        match value {
            Some(v) if !v.is_empty() => Self::Resolved(PathBuf::from(v)),
            _ => Self::Unavailable,
        }
    }

    /// Launcher script for `site`, `Ok(None)` when the site needs none.
    ///
    /// # Errors
    ///
    /// Returns the name of the missing environment variable when `site`
    /// needs a launcher and none was resolved.
    pub fn for_site(&self, site: Option<&str>) -> Result<Option<PathBuf>, &'static str> {
        match (site, self) {
            (Some(SITE_ESS_E3), Self::Resolved(dir)) => Ok(Some(dir.join(E3_LAUNCHER_SCRIPT))),
            (Some(SITE_ESS_E3), Self::Unavailable) => Err(E3_REQUIRE_BIN),
            _ => Ok(None),
        }
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
