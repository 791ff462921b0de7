//! Instance add / remove through `InstanceManager`, with a recording
//! `systemctl` and a real temp directory tree.

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use procserv_cli::application::ports::DefinitionStore;
use procserv_cli::application::services::lifecycle::{
    AddRequest, InstanceManager, Regenerate, RemoveOutcome, RemoveRequest,
};
use procserv_cli::domain::config::{Launcher, Scope, ToolPaths};
use procserv_cli::domain::error::{ConfigError, ExternalCommandError, InstanceError};
use procserv_cli::domain::instance::Endpoint;
use procserv_cli::infra::config_store::IniConfigStore;
use procserv_cli::infra::fs::LocalFs;

use crate::helpers::{
    FixedHost, RecordingReporter, RecordingRunner, entries, store_for, tool_paths, write_file,
};

const HOST: FixedHost = FixedHost("ioc-host");

struct Fixture {
    _root: tempfile::TempDir,
    paths: ToolPaths,
    store: IniConfigStore,
    cwd: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        let paths = tool_paths(root.path(), Scope::System);
        let store = store_for(&paths);
        let cwd = root.path().join("work");
        Self {
            _root: root,
            paths,
            store,
            cwd,
        }
    }

    fn manager<'a>(
        &'a self,
        runner: &'a RecordingRunner,
        launcher: &'a Launcher,
    ) -> InstanceManager<'a, IniConfigStore, LocalFs, RecordingRunner, FixedHost> {
        InstanceManager {
            store: &self.store,
            fs: &LocalFs,
            runner,
            host: &HOST,
            paths: &self.paths,
            launcher,
            cwd: &self.cwd,
        }
    }

    fn regenerate(&self) -> Regenerate {
        Regenerate {
            writeconf: true,
            writesysd: true,
            outsysd: self.paths.systemd_dir.clone(),
            reload: false,
        }
    }

    fn add_request(&self, name: &str) -> AddRequest {
        AddRequest {
            name: name.to_string(),
            chdir: Some(PathBuf::from("/opt/iocs").join(name)),
            command: vec!["./st.cmd".to_string()],
            port: Some("4000".to_string()),
            user: None,
            group: None,
            host: None,
            site: None,
            force: false,
            autostart: false,
            regenerate: self.regenerate(),
        }
    }

    fn remove_request(&self, name: &str, force: bool) -> RemoveRequest {
        RemoveRequest {
            name: name.to_string(),
            force,
            regenerate: self.regenerate(),
        }
    }

    fn instance_file(&self, name: &str) -> PathBuf {
        self.paths.config_dir().join(format!("{name}.conf"))
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("read")
}

// ── add ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_writes_definition_and_regenerates_everything() {
    let fx = Fixture::new();
    let runner = RecordingRunner::default();
    let reporter = RecordingReporter::default();
    let launcher = Launcher::Unavailable;

    let def = fx
        .manager(&runner, &launcher)
        .add(&fx.add_request("ioc1"), &reporter)
        .await
        .expect("add");

    assert_eq!(def.chdir, PathBuf::from("/opt/iocs/ioc1"));
    assert_eq!(def.command, "/opt/iocs/ioc1/st.cmd");
    assert_eq!(def.endpoint, Endpoint::Tcp(4000));

    let text = read(&fx.instance_file("ioc1"));
    assert!(text.starts_with("[ioc1]\n"), "{text}");
    assert!(text.contains("command = /opt/iocs/ioc1/st.cmd\n"), "{text}");
    assert!(text.contains("port = tcp:4000\n"), "{text}");

    assert!(fx.paths.conserver_conf.exists());
    assert!(read(&fx.paths.conserver_conf).contains("console ioc1 {"));
    assert!(fx.paths.systemd_dir.join("ioc@ioc1.service").exists());
    assert_eq!(
        entries(&fx.paths.systemd_dir.join("multi-user.target.wants")),
        vec!["ioc@ioc1.service".to_string()]
    );

    assert_eq!(runner.calls(), vec!["systemctl --system daemon-reload".to_string()]);
    assert_eq!(
        reporter.hints(),
        vec![
            "systemctl restart conserver".to_string(),
            "systemctl start ioc@ioc1.service".to_string(),
        ]
    );
}

#[tokio::test]
async fn add_resolves_relative_paths_and_quotes_arguments() {
    let fx = Fixture::new();
    let runner = RecordingRunner::default();
    let launcher = Launcher::Unavailable;
    let mut req = fx.add_request("ioc1");
    req.chdir = Some(PathBuf::from("iocs/../iocs/ioc1"));
    req.command = vec!["bin/run".to_string(), "--opt".to_string(), "a b".to_string()];

    let def = fx
        .manager(&runner, &launcher)
        .add(&req, &RecordingReporter::default())
        .await
        .expect("add");

    let chdir = fx.cwd.join("iocs").join("ioc1");
    assert_eq!(def.chdir, chdir);
    let program = chdir.join("bin").join("run");
    assert_eq!(
        shell_words::split(&def.command).expect("split"),
        vec![program.display().to_string(), "--opt".to_string(), "a b".to_string()]
    );
}

#[tokio::test]
async fn add_without_chdir_uses_the_working_directory() {
    let fx = Fixture::new();
    let runner = RecordingRunner::default();
    let launcher = Launcher::Unavailable;
    let mut req = fx.add_request("ioc1");
    req.chdir = None;
    req.port = None;

    let def = fx
        .manager(&runner, &launcher)
        .add(&req, &RecordingReporter::default())
        .await
        .expect("add");

    assert_eq!(def.chdir, fx.cwd);
    assert_eq!(def.endpoint, Endpoint::Tcp(0));
}

#[tokio::test]
async fn add_refuses_an_existing_file_without_force() {
    let fx = Fixture::new();
    write_file(&fx.instance_file("ioc1"), "[ioc1]\ncommand = /old\n");
    let runner = RecordingRunner::default();
    let launcher = Launcher::Unavailable;

    let err = fx
        .manager(&runner, &launcher)
        .add(&fx.add_request("ioc1"), &RecordingReporter::default())
        .await
        .expect_err("exists");

    assert!(matches!(
        err.downcast_ref::<InstanceError>(),
        Some(InstanceError::AlreadyExists { name, .. }) if name == "ioc1"
    ));
    assert_eq!(read(&fx.instance_file("ioc1")), "[ioc1]\ncommand = /old\n");
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn add_refuses_a_name_defined_in_the_main_file() {
    let fx = Fixture::new();
    write_file(&fx.paths.config_file(), "[ioc1]\ncommand = /old\n");
    let runner = RecordingRunner::default();
    let launcher = Launcher::Unavailable;

    let err = fx
        .manager(&runner, &launcher)
        .add(&fx.add_request("ioc1"), &RecordingReporter::default())
        .await
        .expect_err("exists");

    match err.downcast_ref::<InstanceError>() {
        Some(InstanceError::AlreadyExists { path, .. }) => assert_eq!(path, &fx.paths.config_file()),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!fx.instance_file("ioc1").exists());
}

#[tokio::test]
async fn forced_add_moves_the_definition_out_of_other_files() {
    let fx = Fixture::new();
    write_file(
        &fx.paths.config_file(),
        "[ioc1]\ncommand = /old\n\n[other]\ncommand = /other\n",
    );
    let runner = RecordingRunner::default();
    let launcher = Launcher::Unavailable;
    let mut req = fx.add_request("ioc1");
    req.force = true;

    fx.manager(&runner, &launcher)
        .add(&req, &RecordingReporter::default())
        .await
        .expect("forced add");

    let main = read(&fx.paths.config_file());
    assert!(!main.contains("[ioc1]"), "{main}");
    assert!(main.contains("[other]"), "{main}");

    let defs = fx.store.load().expect("load");
    assert_eq!(defs.len(), 2);
    let ioc1 = defs.get("ioc1").expect("ioc1");
    assert_eq!(ioc1.source, fx.instance_file("ioc1"));
    assert_eq!(ioc1.definition.command, "/opt/iocs/ioc1/st.cmd");
}

#[tokio::test]
async fn forced_add_overwrites_its_own_file() {
    let fx = Fixture::new();
    write_file(&fx.instance_file("ioc1"), "[ioc1]\ncommand = /old\n");
    let runner = RecordingRunner::default();
    let launcher = Launcher::Unavailable;
    let mut req = fx.add_request("ioc1");
    req.force = true;

    fx.manager(&runner, &launcher)
        .add(&req, &RecordingReporter::default())
        .await
        .expect("forced add");

    assert!(read(&fx.instance_file("ioc1")).contains("command = /opt/iocs/ioc1/st.cmd"));
}

#[tokio::test]
async fn add_without_a_command_is_rejected() {
    let fx = Fixture::new();
    let runner = RecordingRunner::default();
    let launcher = Launcher::Unavailable;
    let mut req = fx.add_request("ioc1");
    req.command.clear();

    let err = fx
        .manager(&runner, &launcher)
        .add(&req, &RecordingReporter::default())
        .await
        .expect_err("no command");

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::MissingOption { option, .. }) if option == "command"
    ));
    assert!(!fx.instance_file("ioc1").exists());
}

#[tokio::test]
async fn add_rejects_invalid_names_before_touching_anything() {
    let fx = Fixture::new();
    let runner = RecordingRunner::default();
    let launcher = Launcher::Unavailable;

    let err = fx
        .manager(&runner, &launcher)
        .add(&fx.add_request("bad/name"), &RecordingReporter::default())
        .await
        .expect_err("invalid name");

    assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::InvalidName(_))));
    assert!(!fx.paths.config_dir().exists());
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn add_rejects_newlines_in_command_arguments() {
    let fx = Fixture::new();
    let runner = RecordingRunner::default();
    let launcher = Launcher::Unavailable;
    let mut req = fx.add_request("ioc1");
    req.command.push("a\nb = c".to_string());

    let err = fx
        .manager(&runner, &launcher)
        .add(&req, &RecordingReporter::default())
        .await
        .expect_err("newline in command");

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::InvalidValue { option, .. }) if option == "command"
    ));
    assert!(!fx.instance_file("ioc1").exists());
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn autostart_starts_the_unit_after_reload() {
    let fx = Fixture::new();
    let runner = RecordingRunner::default();
    let reporter = RecordingReporter::default();
    let launcher = Launcher::Unavailable;
    let mut req = fx.add_request("ioc1");
    req.autostart = true;
    req.regenerate.reload = true;

    fx.manager(&runner, &launcher).add(&req, &reporter).await.expect("add");

    assert_eq!(
        runner.calls(),
        vec![
            "systemctl --system restart conserver".to_string(),
            "systemctl --system daemon-reload".to_string(),
            "systemctl --system start ioc@ioc1.service".to_string(),
        ]
    );
    assert!(reporter.hints().is_empty());
}

#[tokio::test]
async fn failing_reload_is_reported_after_the_definition_is_written() {
    let fx = Fixture::new();
    let runner = RecordingRunner::failing_on("daemon-reload");
    let launcher = Launcher::Unavailable;

    let err = fx
        .manager(&runner, &launcher)
        .add(&fx.add_request("ioc1"), &RecordingReporter::default())
        .await
        .expect_err("reload fails");

    let ext = err.downcast_ref::<ExternalCommandError>().expect("ExternalCommandError");
    assert_eq!(ext.command, "systemctl --system daemon-reload");
    assert!(ext.stderr.contains("Failed to connect to bus"));
    assert!(fx.instance_file("ioc1").exists());
}

#[tokio::test]
async fn skipped_artifacts_are_not_written() {
    let fx = Fixture::new();
    let runner = RecordingRunner::default();
    let launcher = Launcher::Unavailable;
    let mut req = fx.add_request("ioc1");
    req.regenerate.writeconf = false;
    req.regenerate.writesysd = false;

    fx.manager(&runner, &launcher)
        .add(&req, &RecordingReporter::default())
        .await
        .expect("add");

    assert!(!fx.paths.conserver_conf.exists());
    assert!(!fx.paths.systemd_dir.exists());
    assert_eq!(runner.calls(), vec!["systemctl --system daemon-reload".to_string()]);
}

// ── site profiles ────────────────────────────────────────────────────────────

#[tokio::test]
async fn site_profile_fills_in_unset_values_and_the_hostname() {
    let fx = Fixture::new();
    write_file(
        &fx.paths.site_profile("lab"),
        "[lab]\nuser = labuser\ngroup = labgroup\n",
    );
    let runner = RecordingRunner::default();
    let reporter = RecordingReporter::default();
    let launcher = Launcher::Unavailable;
    let mut req = fx.add_request("ioc1");
    req.site = Some("lab".to_string());
    req.group = Some("override".to_string());

    let def = fx.manager(&runner, &launcher).add(&req, &reporter).await.expect("add");

    assert_eq!(def.user.as_deref(), Some("labuser"));
    assert_eq!(def.group.as_deref(), Some("override"));
    assert_eq!(def.host.as_deref(), Some("ioc-host"));
    assert_eq!(def.site.as_deref(), Some("lab"));
    assert!(reporter.warnings().is_empty(), "{:?}", reporter.warnings());
}

#[tokio::test]
async fn missing_site_profile_warns_and_continues() {
    let fx = Fixture::new();
    let runner = RecordingRunner::default();
    let reporter = RecordingReporter::default();
    let launcher = Launcher::Unavailable;
    let mut req = fx.add_request("ioc1");
    req.site = Some("lab".to_string());

    let def = fx.manager(&runner, &launcher).add(&req, &reporter).await.expect("add");

    assert_eq!(def.site.as_deref(), Some("lab"));
    assert_eq!(def.user, None);
    assert_eq!(def.host, None);
    let warnings = reporter.warnings();
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(warnings[0].contains("No site config file for 'lab'"), "{warnings:?}");
}

#[tokio::test]
async fn incomplete_site_profile_warns_per_missing_key() {
    let fx = Fixture::new();
    write_file(&fx.paths.site_profile("lab"), "[lab]\nhost = other-host\n");
    let runner = RecordingRunner::default();
    let reporter = RecordingReporter::default();
    let launcher = Launcher::Unavailable;
    let mut req = fx.add_request("ioc1");
    req.site = Some("lab".to_string());

    let def = fx.manager(&runner, &launcher).add(&req, &reporter).await.expect("add");

    assert_eq!(def.host.as_deref(), Some("other-host"));
    let warnings = reporter.warnings();
    assert_eq!(warnings.len(), 2, "{warnings:?}");
    assert!(warnings.iter().any(|w| w.contains("missing key 'user'")));
    assert!(warnings.iter().any(|w| w.contains("missing key 'group'")));
}

#[tokio::test]
async fn ess_e3_site_imposes_its_layout() {
    let fx = Fixture::new();
    let base = fx.cwd.join("iocs");
    write_file(
        &fx.paths.site_profile("ess-e3"),
        &format!("[ess-e3]\nuser = iocuser\ngroup = iocgroup\nbase_dir = {}\n", base.display()),
    );
    let runner = RecordingRunner::default();
    let launcher = Launcher::Resolved(PathBuf::from("/opt/e3/bin"));
    let mut req = fx.add_request("ioc1");
    req.site = Some("ess-e3".to_string());
    req.command.clear();
    req.port = None;

    let def = fx
        .manager(&runner, &launcher)
        .add(&req, &RecordingReporter::default())
        .await
        .expect("add");

    let instance_runtime = fx.paths.runtime_dir.join("ioc@ioc1");
    assert_eq!(def.chdir, base.join("ioc1"));
    assert_eq!(def.command, "st.ioc1.cmd");
    assert_eq!(def.endpoint, Endpoint::Unix(instance_runtime.join("control")));
    assert_eq!(def.user.as_deref(), Some("iocuser"));
    assert!(instance_runtime.is_dir());

    let unit = read(&fx.paths.systemd_dir.join("ioc@ioc1.service"));
    assert!(unit.contains("/opt/e3/bin/iocsh.bash"), "{unit}");
    let registry = read(&fx.paths.conserver_conf);
    assert!(registry.contains("type uds;"), "{registry}");
}

// ── remove ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn removing_an_unknown_instance_does_nothing() {
    let fx = Fixture::new();
    let runner = RecordingRunner::default();
    let launcher = Launcher::Unavailable;

    let outcome = fx
        .manager(&runner, &launcher)
        .remove(
            &fx.remove_request("ghost", false),
            |_| Err(anyhow::anyhow!("no prompt expected")),
            &RecordingReporter::default(),
        )
        .await
        .expect("remove");

    assert_eq!(outcome, RemoveOutcome::NotFound);
    assert!(runner.calls().is_empty());
    assert!(!fx.paths.conserver_conf.exists());
}

#[tokio::test]
async fn declined_confirmation_keeps_the_definition() {
    let fx = Fixture::new();
    write_file(&fx.instance_file("ioc1"), "[ioc1]\ncommand = /x\n");
    let runner = RecordingRunner::default();
    let launcher = Launcher::Unavailable;

    let outcome = fx
        .manager(&runner, &launcher)
        .remove(&fx.remove_request("ioc1", false), |_| Ok(false), &RecordingReporter::default())
        .await
        .expect("remove");

    assert_eq!(outcome, RemoveOutcome::Cancelled);
    assert!(fx.instance_file("ioc1").exists());
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn confirmed_remove_deletes_and_regenerates() {
    let fx = Fixture::new();
    let runner = RecordingRunner::default();
    let reporter = RecordingReporter::default();
    let launcher = Launcher::Unavailable;
    let manager = fx.manager(&runner, &launcher);
    manager
        .add(&fx.add_request("ioc1"), &RecordingReporter::default())
        .await
        .expect("add");
    assert!(fx.paths.systemd_dir.join("ioc@ioc1.service").exists());

    let mut prompt = String::new();
    let outcome = manager
        .remove(
            &fx.remove_request("ioc1", false),
            |p| {
                prompt = p.to_string();
                Ok(true)
            },
            &reporter,
        )
        .await
        .expect("remove");

    assert_eq!(outcome, RemoveOutcome::Removed);
    assert!(prompt.contains("'ioc1'"), "{prompt}");
    assert!(prompt.contains(&fx.instance_file("ioc1").display().to_string()), "{prompt}");
    assert!(!fx.instance_file("ioc1").exists());
    assert!(!fx.paths.systemd_dir.join("ioc@ioc1.service").exists());
    assert!(entries(&fx.paths.systemd_dir.join("multi-user.target.wants")).is_empty());
    assert!(!read(&fx.paths.conserver_conf).contains("console ioc1"));
    assert_eq!(
        reporter.hints().last().map(String::as_str),
        Some("systemctl stop ioc@ioc1.service")
    );
    assert_eq!(
        runner.calls(),
        vec![
            "systemctl --system daemon-reload".to_string(),
            "systemctl --system daemon-reload".to_string(),
        ]
    );
}

#[tokio::test]
async fn forced_remove_skips_confirmation_and_keeps_other_sections() {
    let fx = Fixture::new();
    write_file(
        &fx.paths.config_file(),
        "[ioc1]\ncommand = /x\n\n[ioc2]\ncommand = /y\n",
    );
    let runner = RecordingRunner::default();
    let launcher = Launcher::Unavailable;

    let outcome = fx
        .manager(&runner, &launcher)
        .remove(
            &fx.remove_request("ioc1", true),
            |_| Err(anyhow::anyhow!("no prompt expected")),
            &RecordingReporter::default(),
        )
        .await
        .expect("remove");

    assert_eq!(outcome, RemoveOutcome::Removed);
    let main = read(&fx.paths.config_file());
    assert!(!main.contains("[ioc1]"), "{main}");
    assert!(main.contains("[ioc2]"), "{main}");
}
