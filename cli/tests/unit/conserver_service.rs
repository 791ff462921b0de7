//! Console-registry writing and the conserver restart / hint.

#![allow(clippy::expect_used)]

use procserv_cli::application::ports::DefinitionStore;
use procserv_cli::application::services::conserver::{publish, write_registry};
use procserv_cli::application::services::service_manager::ServiceManager;
use procserv_cli::domain::config::Scope;
use procserv_cli::domain::error::ExternalCommandError;
use procserv_cli::infra::fs::LocalFs;

use crate::helpers::{RecordingReporter, RecordingRunner, store_for, tool_paths, write_file};

const STORE: &str = "\
[tcp1]
command = x
port = tcp:4000

[uds1]
command = y
port = unix:/somewhere/else

[off]
command = z
port = 5000
instance = no
";

#[test]
fn registry_lists_every_definition_including_disabled() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = tool_paths(dir.path(), Scope::System);
    write_file(&paths.config_file(), STORE);
    let defs = store_for(&paths).load().expect("load");

    write_registry(&LocalFs, &defs, &paths.conserver_conf, &paths.runtime_dir).expect("write");

    let text = std::fs::read_to_string(&paths.conserver_conf).expect("read");
    let uds = paths.runtime_dir.join("ioc@uds1").join("control");
    let expected = format!(
        "\nconsole tcp1 {{\n    master localhost;\n    type host;\n    host localhost;\n    port 4000;\n}}\n\
         \nconsole uds1 {{\n    master localhost;\n    type uds;\n    uds {};\n}}\n\
         \nconsole off {{\n    master localhost;\n    type host;\n    host localhost;\n    port 5000;\n}}\n",
        uds.display()
    );
    assert_eq!(text, expected);
}

#[tokio::test]
async fn publish_without_reload_prints_restart_hint() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = tool_paths(dir.path(), Scope::System);
    write_file(&paths.config_file(), STORE);
    let defs = store_for(&paths).load().expect("load");
    let runner = RecordingRunner::default();
    let reporter = RecordingReporter::default();
    let services = ServiceManager::new(&runner, &paths.systemctl, paths.scope);

    publish(&LocalFs, &services, &reporter, &defs, &paths.conserver_conf, &paths.runtime_dir, false)
        .await
        .expect("publish");

    assert!(runner.calls().is_empty());
    assert_eq!(reporter.hints(), vec!["systemctl restart conserver".to_string()]);
}

#[tokio::test]
async fn publish_with_reload_restarts_conserver() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = tool_paths(dir.path(), Scope::System);
    write_file(&paths.config_file(), STORE);
    let defs = store_for(&paths).load().expect("load");
    let runner = RecordingRunner::default();
    let reporter = RecordingReporter::default();
    let services = ServiceManager::new(&runner, &paths.systemctl, paths.scope);

    publish(&LocalFs, &services, &reporter, &defs, &paths.conserver_conf, &paths.runtime_dir, true)
        .await
        .expect("publish");

    assert_eq!(runner.calls(), vec!["systemctl --system restart conserver".to_string()]);
    assert!(reporter.hints().is_empty());
}

#[tokio::test]
async fn failed_restart_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = tool_paths(dir.path(), Scope::User);
    write_file(&paths.config_file(), STORE);
    let defs = store_for(&paths).load().expect("load");
    let runner = RecordingRunner::failing_on("restart");
    let services = ServiceManager::new(&runner, &paths.systemctl, paths.scope);

    let err = publish(
        &LocalFs,
        &services,
        &RecordingReporter::default(),
        &defs,
        &paths.conserver_conf,
        &paths.runtime_dir,
        true,
    )
    .await
    .expect_err("restart fails");

    let ext = err.downcast_ref::<ExternalCommandError>().expect("ExternalCommandError");
    assert_eq!(ext.command, "systemctl --user restart conserver");
    assert!(paths.conserver_conf.exists(), "file is written before the restart");
}
