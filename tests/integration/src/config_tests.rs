//! Building orchestrators from configuration files

use std::fs;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use syncconf_core::{
    ConfigureOutcome, ControllerRef, Error, NullObserver, Orchestrator, OrchestratorConfig,
    OrchestratorState,
};
use syncconf_test_utils::{AckBehavior, CallLog, FakeBackend, FakeController, RecordingObserver};
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("sync.toml");
    fs::write(&path, content).unwrap();
    path
}

fn controllers(log: &CallLog) -> Vec<Arc<FakeController>> {
    ["bookmarks", "preferences", "autofill", "typed_urls"]
        .into_iter()
        .map(|name| FakeController::new(name, log.clone()))
        .collect()
}

#[test]
fn test_config_start_order_drives_start_sequence() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        r#"
start_order = ["typed_urls", "autofill", "preferences", "bookmarks"]
first_run = false
initial_types = ["bookmarks", "autofill", "typed_urls", "preferences"]
"#,
    );
    let config = OrchestratorConfig::load(&path).unwrap();

    let log = CallLog::new();
    let controllers = controllers(&log);
    let observer = RecordingObserver::new();
    let mut orchestrator = Orchestrator::from_config(
        &config,
        controllers.iter().map(|c| c.clone() as ControllerRef),
        Arc::new(FakeBackend::new(AckBehavior::Immediate, log.clone())),
        Box::new(observer.clone()),
    )
    .unwrap();

    orchestrator.configure(config.initial_set());

    assert_eq!(
        log.starts(),
        vec!["typed_urls", "autofill", "preferences", "bookmarks"]
    );
    assert!(controllers.iter().all(|c| c.first_runs() == vec![false]));
    assert_eq!(observer.outcomes(), vec![ConfigureOutcome::Ok]);
    assert_eq!(orchestrator.state(), OrchestratorState::Configured);
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, r#"start_order = ["bookmarks", "bookmarks"]"#);

    let result = OrchestratorConfig::load(&path);
    assert!(matches!(result, Err(Error::InvalidConfig { .. })));
}

#[test]
fn test_default_config_uses_builtin_order() {
    let log = CallLog::new();
    let controllers = controllers(&log);
    let mut orchestrator = Orchestrator::from_config(
        &OrchestratorConfig::default(),
        controllers.iter().rev().map(|c| c.clone() as ControllerRef),
        Arc::new(FakeBackend::new(AckBehavior::Immediate, log.clone())),
        Box::new(NullObserver),
    )
    .unwrap();

    orchestrator.configure(syncconf_core::domain_set([
        "typed_urls",
        "preferences",
        "bookmarks",
    ]));

    assert_eq!(log.starts(), vec!["bookmarks", "preferences", "typed_urls"]);
}
