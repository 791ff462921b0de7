//! Instance add / remove and the regeneration that follows them.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::application::ports::{
    CommandRunner, DefinitionStore, HostInfo, LocalFs, ProgressReporter,
};
use crate::application::services::service_manager::ServiceManager;
use crate::application::services::{conserver, unit_generator};
use crate::domain::config::{Launcher, ToolPaths};
use crate::domain::error::{InstanceError, SiteProfileError};
use crate::domain::ini::IniSection;
use crate::domain::instance::{
    DEFAULT_PORT, InstanceDefinition, SITE_ESS_E3, absolutize, unit_name, validate_instance_name,
};
use crate::domain::site::{SiteProfile, ess_e3_layout, parse_site_profile};

/// Which artifacts to regenerate after the store changed.
#[derive(Debug, Clone)]
pub struct Regenerate {
    pub writeconf: bool,
    pub writesysd: bool,
    /// Unit output directory.
    pub outsysd: PathBuf,
    /// Restart conserver after rewriting its file.
    pub reload: bool,
}

/// Parameters of `add`.
#[derive(Debug, Clone)]
pub struct AddRequest {
    pub name: String,
    /// Defaults to the current directory.
    pub chdir: Option<PathBuf>,
    /// Command tokens; the first is made absolute against `chdir`.
    pub command: Vec<String>,
    pub port: Option<String>,
    pub user: Option<String>,
    pub group: Option<String>,
    pub host: Option<String>,
    pub site: Option<String>,
    pub force: bool,
    pub autostart: bool,
    pub regenerate: Regenerate,
}

/// Parameters of `remove`.
#[derive(Debug, Clone)]
pub struct RemoveRequest {
    pub name: String,
    pub force: bool,
    pub regenerate: Regenerate,
}

/// Result of [`InstanceManager::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// No config file defines the instance; nothing was touched.
    NotFound,
    /// The operator declined the confirmation.
    Cancelled,
}

/// Everything add/remove touch, borrowed for one command.
pub struct InstanceManager<'a, S, F, R, H> {
    pub store: &'a S,
    pub fs: &'a F,
    pub runner: &'a R,
    pub host: &'a H,
    pub paths: &'a ToolPaths,
    pub launcher: &'a Launcher,
    /// Base for relative `chdir` values.
    pub cwd: &'a Path,
}

impl<S, F, R, H> InstanceManager<'_, S, F, R, H>
where
    S: DefinitionStore,
    F: LocalFs,
    R: CommandRunner,
    H: HostInfo,
{
    fn services(&self) -> ServiceManager<'_, R> {
        ServiceManager::new(self.runner, &self.paths.systemctl, self.paths.scope)
    }

    /// Define a new instance, regenerate, and optionally start it.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceError::AlreadyExists`] when the name is taken and
    /// `force` is not set, a [`crate::domain::ConfigError`] for a broken
    /// store or an invalid definition, and any regeneration or `systemctl`
    /// failure.
    pub async fn add(&self, req: &AddRequest, reporter: &impl ProgressReporter) -> Result<InstanceDefinition> {
        validate_instance_name(&req.name)?;
        let existing = self.store.load()?;
        let target = self.store.definition_file(&req.name);
        let defined_elsewhere = existing.get(&req.name).map(|e| e.source.clone());

        if !req.force {
            if self.fs.exists(&target) {
                return Err(InstanceError::AlreadyExists {
                    name: req.name.clone(),
                    path: target,
                }
                .into());
            }
            if let Some(path) = defined_elsewhere {
                return Err(InstanceError::AlreadyExists {
                    name: req.name.clone(),
                    path,
                }
                .into());
            }
        }

        let definition = self.build_definition(req, reporter)?;

        if let Some(other) = existing.get(&req.name).filter(|e| e.source != target) {
            tracing::info!(source = %other.source.display(), "replacing existing definition");
            self.store.remove(&req.name)?;
        }
        self.store.write(&definition, &target)?;
        reporter.success(&format!("Wrote {}", target.display()));

        self.regenerate(&req.regenerate, reporter).await?;

        let unit = definition.unit_name();
        if req.autostart {
            reporter.step(&format!("Starting {unit}..."));
            self.services().start(&unit).await?;
            reporter.success(&format!("Started {unit}"));
        } else {
            reporter.hint(&format!("systemctl start {unit}"));
        }
        Ok(definition)
    }

    fn build_definition(&self, req: &AddRequest, reporter: &impl ProgressReporter) -> Result<InstanceDefinition> {
        let mut user = req.user.clone();
        let mut group = req.group.clone();
        let mut host = req.host.clone();
        let mut base_dir = None;

        if let Some(site) = &req.site {
            if let Some(profile) = self.read_site_profile(site, reporter) {
                user = user.or(profile.user);
                group = group.or(profile.group);
                host = host.or(profile.host);
                if host.is_none() {
                    match self.host.hostname() {
                        Ok(name) => host = Some(name),
                        Err(e) => reporter.warn(&format!("Cannot determine hostname: {e:#}")),
                    }
                }
                base_dir = profile.base_dir;
            }
        }

        let chdir = absolutize(self.cwd, req.chdir.as_deref().unwrap_or(self.cwd));
        let mut command = String::new();
        if let Some((first, rest)) = req.command.split_first() {
            let program = absolutize(&chdir, Path::new(first)).display().to_string();
            let tokens = std::iter::once(program.as_str()).chain(rest.iter().map(String::as_str));
            command = shell_words::join(tokens);
        }
        let mut chdir = chdir;
        let mut port = req.port.clone().unwrap_or_else(|| DEFAULT_PORT.to_string());

        if req.site.as_deref() == Some(SITE_ESS_E3)
            && let Some(base) = &base_dir
        {
            let layout = ess_e3_layout(&req.name, base, &self.paths.runtime_dir);
            chdir = layout.chdir;
            command = layout.command;
            port = layout.port;
            self.provision_runtime_dir(&layout.runtime_dir, user.as_deref(), group.as_deref(), reporter);
        }

        let mut section = IniSection::new(&req.name);
        if !command.is_empty() {
            section.set("command", command);
        }
        section.set("chdir", chdir.display().to_string());
        section.set("port", port);
        for (key, value) in [("user", &user), ("group", &group), ("host", &host), ("site", &req.site)] {
            if let Some(value) = value {
                section.set(key, value.as_str());
            }
        }
        Ok(InstanceDefinition::from_section(&section)?)
    }

    /// `None` when the profile cannot be used at all; missing keys still
    /// yield the keys that were present.
    fn read_site_profile(&self, site: &str, reporter: &impl ProgressReporter) -> Option<SiteProfile> {
        let path = self.paths.site_profile(site);
        let warn = |err: &SiteProfileError| {
            tracing::warn!(%site, error = %err, "site profile problem");
            reporter.warn(&err.to_string());
        };
        let text = match self.fs.read_if_exists(&path) {
            Ok(Some(text)) => text,
            Ok(None) => {
                warn(&SiteProfileError::NotFound {
                    site: site.to_string(),
                    path,
                });
                return None;
            }
            Err(e) => {
                warn(&SiteProfileError::Malformed {
                    site: site.to_string(),
                    message: format!("{e:#}"),
                });
                return None;
            }
        };
        let (profile, errors) = parse_site_profile(site, &text);
        errors.iter().for_each(warn);
        let unusable = errors.iter().any(|e| {
            matches!(
                e,
                SiteProfileError::MissingSection { .. } | SiteProfileError::Malformed { .. }
            )
        });
        (!unusable).then_some(profile)
    }

    /// Best effort: failures are only reported.
    fn provision_runtime_dir(
        &self,
        dir: &Path,
        user: Option<&str>,
        group: Option<&str>,
        reporter: &impl ProgressReporter,
    ) {
        if let Err(e) = self.fs.create_dir_all(dir) {
            tracing::warn!(path = %dir.display(), error = %format!("{e:#}"), "cannot create runtime directory");
            reporter.warn(&format!("Cannot create {}: {e:#}", dir.display()));
            return;
        }
        if user.is_none() && group.is_none() {
            return;
        }
        if let Err(e) = self.fs.chown(dir, user, group) {
            tracing::warn!(path = %dir.display(), error = %format!("{e:#}"), "cannot chown runtime directory");
            reporter.warn(&format!("Cannot chown {}: {e:#}", dir.display()));
        }
    }

    /// Delete an instance's definition and regenerate.
    ///
    /// `confirm` is only consulted when `force` is not set.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or rewritten, or on any
    /// regeneration or `systemctl` failure.
    pub async fn remove(
        &self,
        req: &RemoveRequest,
        confirm: impl FnOnce(&str) -> Result<bool>,
        reporter: &impl ProgressReporter,
    ) -> Result<RemoveOutcome> {
        let files = self.store.locate(&req.name)?;
        if files.is_empty() {
            tracing::debug!(name = %req.name, "not defined, nothing to remove");
            return Ok(RemoveOutcome::NotFound);
        }

        if !req.force {
            let listed: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
            let prompt = format!("Remove '{}' from {}?", req.name, listed.join(", "));
            if !confirm(&prompt)? {
                return Ok(RemoveOutcome::Cancelled);
            }
        }

        self.store.remove(&req.name)?;
        reporter.success(&format!("Removed '{}'", req.name));

        self.regenerate(&req.regenerate, reporter).await?;
        reporter.hint(&format!("systemctl stop {}", unit_name(&req.name)));
        Ok(RemoveOutcome::Removed)
    }

    /// Rewrite the requested artifacts from the current store, then
    /// `daemon-reload`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be loaded, an artifact cannot be
    /// written, or `systemctl` fails.
    pub async fn regenerate(&self, opts: &Regenerate, reporter: &impl ProgressReporter) -> Result<()> {
        let services = self.services();
        if opts.writeconf || opts.writesysd {
            let definitions = self.store.load()?;
            if opts.writeconf {
                conserver::publish(
                    self.fs,
                    &services,
                    reporter,
                    &definitions,
                    &self.paths.conserver_conf,
                    &self.paths.runtime_dir,
                    opts.reload,
                )
                .await?;
            }
            if opts.writesysd {
                let template = self.paths.unit_template(self.launcher);
                let report = unit_generator::reconcile(self.fs, &definitions, &opts.outsysd, &template)?;
                reporter.success(&format!(
                    "Units in {}: {} written, {} unchanged, {} removed",
                    opts.outsysd.display(),
                    report.written.len(),
                    report.unchanged.len(),
                    report.removed.len()
                ));
            }
        }
        reporter.step("Reloading service manager...");
        services.daemon_reload().await
    }
}
