//! Instance definitions: the typed form of one config-file section.
//!
//! Pure functions only: no I/O, no async.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::ConfigError;
use crate::domain::ini::{IniDocument, IniSection};

/// Unit instance names: systemd accepts more, but these are also file names.
pub static INSTANCE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Safety: this is a compile-time constant pattern: cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.:-]{0,127}$").expect("valid regex")
});

pub const DEFAULT_USER: &str = "nobody";
pub const DEFAULT_GROUP: &str = "nogroup";
pub const DEFAULT_CHDIR: &str = "/";
pub const DEFAULT_PORT: &str = "0";

/// Site tag of the one site profile with its own generation rules.
pub const SITE_ESS_E3: &str = "ess-e3";

const UNIT_PREFIX: &str = "ioc@";
const UNIT_SUFFIX: &str = ".service";

/// Where procServ accepts console connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Tcp(u16),
    Unix(PathBuf),
}

impl Endpoint {
    /// Classify a `port` option value.
    ///
    /// `tcp:<port>` and bare digits are TCP, `unix:<path>` and anything else
    /// non-empty is a local socket path.
    ///
    /// # Errors
    ///
    /// Returns a reason string for empty values and unparseable port numbers.
    pub fn parse(value: &str) -> Result<Self, String> {
        let value = value.trim();
        if value.is_empty() {
            return Err("empty endpoint".to_string());
        }
        if let Some(port) = value.strip_prefix("tcp:") {
            return parse_port(port.trim()).map(Self::Tcp);
        }
        if value.bytes().all(|b| b.is_ascii_digit()) {
            return parse_port(value).map(Self::Tcp);
        }
        if let Some(path) = value.strip_prefix("unix:") {
            if path.is_empty() {
                return Err("empty socket path".to_string());
            }
            return Ok(Self::Unix(PathBuf::from(path)));
        }
        Ok(Self::Unix(PathBuf::from(value)))
    }

    /// The `--port=` argument procServ expects.
    #[must_use]
    pub fn procserv_arg(&self) -> String {
        match self {
            Self::Tcp(port) => port.to_string(),
            Self::Unix(path) => format!("unix:{}", path.display()),
        }
    }
}

fn parse_port(text: &str) -> Result<u16, String> {
    text.parse::<u16>()
        .map_err(|_| format!("'{text}' is not a TCP port number"))
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(port) => write!(f, "tcp:{port}"),
            Self::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}

/// One procServ instance, validated at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDefinition {
    pub name: String,
    pub enabled: bool,
    pub user: Option<String>,
    pub group: Option<String>,
    pub chdir: PathBuf,
    /// Shell-escaped command line.
    pub command: String,
    pub endpoint: Endpoint,
    pub host: Option<String>,
    pub site: Option<String>,
}

impl InstanceDefinition {
    /// Build a definition from a section that already has `[DEFAULT]` merged in.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an invalid name, a missing `command`, or
    /// an invalid `instance` / `port` / `chdir` value.
    pub fn from_section(section: &IniSection) -> Result<Self, ConfigError> {
        let name = section.name.clone();
        validate_instance_name(&name)?;

        let invalid = |option: &str, value: &str, reason: String| ConfigError::InvalidValue {
            instance: name.clone(),
            option: option.to_string(),
            value: value.to_string(),
            reason,
        };

        for option in ["command", "chdir", "port", "user", "group", "host", "site"] {
            if let Some(value) = section.get(option)
                && value.chars().any(char::is_control)
            {
                return Err(invalid(option, value, "must not contain control characters".to_string()));
            }
        }

        let enabled = match section.get("instance") {
            None => true,
            Some(v) => parse_bool(v).ok_or_else(|| {
                invalid("instance", v, "expected a boolean".to_string())
            })?,
        };

        let command = section
            .get("command")
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingOption {
                instance: name.clone(),
                option: "command".to_string(),
            })?
            .to_string();

        let chdir_raw = section.get("chdir").unwrap_or(DEFAULT_CHDIR);
        let chdir = PathBuf::from(chdir_raw);
        if !chdir.is_absolute() {
            return Err(invalid("chdir", chdir_raw, "must be an absolute path".to_string()));
        }

        let port_raw = section.get("port").unwrap_or(DEFAULT_PORT);
        let endpoint = Endpoint::parse(port_raw).map_err(|reason| invalid("port", port_raw, reason))?;

        Ok(Self {
            enabled,
            user: non_empty(section.get("user")),
            group: non_empty(section.get("group")),
            chdir,
            command,
            endpoint,
            host: non_empty(section.get("host")),
            site: non_empty(section.get("site")),
            name,
        })
    }

    /// Section written to the instance's own config file.
    #[must_use]
    pub fn to_section(&self) -> IniSection {
        let mut s = IniSection::new(&self.name);
        s.set("command", &self.command);
        s.set("chdir", self.chdir.display().to_string());
        if !self.enabled {
            s.set("instance", "0");
        }
        if let Some(user) = &self.user {
            s.set("user", user);
        }
        if let Some(group) = &self.group {
            s.set("group", group);
        }
        if let Some(host) = &self.host {
            s.set("host", host);
        }
        if let Some(site) = &self.site {
            s.set("site", site);
        }
        s.set("port", self.endpoint.to_string());
        s
    }

    #[must_use]
    pub fn unit_name(&self) -> String {
        unit_name(&self.name)
    }

    #[must_use]
    pub fn effective_user(&self) -> &str {
        self.user.as_deref().unwrap_or(DEFAULT_USER)
    }

    #[must_use]
    pub fn effective_group(&self) -> &str {
        self.group.as_deref().unwrap_or(DEFAULT_GROUP)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// configparser boolean spellings.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// # Errors
///
/// Returns [`ConfigError::InvalidName`] if `name` is not a valid instance name.
pub fn validate_instance_name(name: &str) -> Result<(), ConfigError> {
    if INSTANCE_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidName(name.to_string()))
    }
}

/// `ioc@<name>.service`
#[must_use]
pub fn unit_name(name: &str) -> String {
    format!("{UNIT_PREFIX}{name}{UNIT_SUFFIX}")
}

/// `ioc@<name>`: also the per-instance runtime directory name.
#[must_use]
pub fn unit_stem(name: &str) -> String {
    format!("{UNIT_PREFIX}{name}")
}

/// Inverse of [`unit_name`]; `None` for files the generator does not own.
#[must_use]
pub fn instance_of_unit_file(file_name: &str) -> Option<&str> {
    file_name
        .strip_prefix(UNIT_PREFIX)?
        .strip_suffix(UNIT_SUFFIX)
        .filter(|name| !name.is_empty())
}

/// Lexically absolute form of `path` against `base`, like `os.path.abspath`.
#[must_use]
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = base.join(path);
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// A definition and the config file it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedDefinition {
    pub definition: InstanceDefinition,
    pub source: PathBuf,
}

/// The merged store, in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definitions {
    entries: Vec<SourcedDefinition>,
}

impl Definitions {
    /// Merge parsed files, given in load order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateInstance`] when two files define the
    /// same name, or the first validation error of any section.
    pub fn from_documents<'a>(
        docs: impl IntoIterator<Item = (&'a Path, &'a IniDocument)>,
    ) -> Result<Self, ConfigError> {
        let mut out = Self::default();
        for (path, doc) in docs {
            for section in &doc.sections {
                if let Some(existing) = out.get(&section.name) {
                    return Err(ConfigError::DuplicateInstance {
                        name: section.name.clone(),
                        first: existing.source.clone(),
                        second: path.to_path_buf(),
                    });
                }
                let definition = InstanceDefinition::from_section(&doc.resolved(section))?;
                out.entries.push(SourcedDefinition {
                    definition,
                    source: path.to_path_buf(),
                });
            }
        }
        Ok(out)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SourcedDefinition> {
        self.entries.iter().find(|e| e.definition.name == name)
    }

    /// Every definition, enabled or not.
    pub fn iter(&self) -> impl Iterator<Item = &InstanceDefinition> {
        self.entries.iter().map(|e| &e.definition)
    }

    pub fn enabled(&self) -> impl Iterator<Item = &InstanceDefinition> {
        self.iter().filter(|d| d.enabled)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
