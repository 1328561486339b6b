//! Container launcher: composition file and `up -d` invocation.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use odoo_ci::application::services::container::launch;
use odoo_ci::domain::config::ContainerConfig;
use odoo_ci::domain::{AppName, PipelineError, WorkingLayout};
use odoo_ci::infra::fs::StdFs;

use crate::mocks::{ScriptedRunner, err_output, journal, ok_output};

fn compose(parts: &[&str]) -> Vec<String> {
    parts.iter().map(ToString::to_string).collect()
}

fn layout(root: &std::path::Path) -> WorkingLayout {
    WorkingLayout::new(root, &AppName::parse("demo").unwrap(), "80")
}

#[tokio::test]
async fn test_launch_writes_composition_and_starts_detached() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new(&journal(), |_, _| ok_output(b""));
    let layout = layout(dir.path());

    launch(
        &runner,
        &StdFs,
        &layout,
        &ContainerConfig::default(),
        &compose(&["docker-compose"]),
    )
    .await
    .expect("launch");

    let yaml = std::fs::read_to_string(dir.path().join("docker-compose.yml")).unwrap();
    assert!(yaml.contains("image: demo80"), "got:\n{yaml}");
    assert!(yaml.contains("container_name: test_demo80"), "got:\n{yaml}");

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].program, "docker-compose");
    assert_eq!(calls[0].args, vec!["up", "-d"]);
    assert_eq!(calls[0].dir.as_deref(), Some(dir.path()));
}

#[tokio::test]
async fn test_launch_supports_compose_plugin_form() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new(&journal(), |_, _| ok_output(b""));

    launch(
        &runner,
        &StdFs,
        &layout(dir.path()),
        &ContainerConfig::default(),
        &compose(&["docker", "compose"]),
    )
    .await
    .expect("launch");

    let call = &runner.calls()[0];
    assert_eq!(call.program, "docker");
    assert_eq!(call.args, vec!["compose", "up", "-d"]);
}

#[tokio::test]
async fn test_launch_overwrites_previous_composition() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("docker-compose.yml"), "other80:\n").unwrap();
    let runner = ScriptedRunner::new(&journal(), |_, _| ok_output(b""));

    launch(
        &runner,
        &StdFs,
        &layout(dir.path()),
        &ContainerConfig::default(),
        &compose(&["docker-compose"]),
    )
    .await
    .expect("launch");

    let yaml = std::fs::read_to_string(dir.path().join("docker-compose.yml")).unwrap();
    assert!(!yaml.contains("other80"));
}

#[tokio::test]
async fn test_launch_failure_carries_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new(&journal(), |_, _| {
        err_output(
            1,
            b"ERROR: for odoo80  Cannot create container: Conflict. The container name \"/test_demo80\" is already in use\n",
        )
    });

    let err = launch(
        &runner,
        &StdFs,
        &layout(dir.path()),
        &ContainerConfig::default(),
        &compose(&["docker-compose"]),
    )
    .await
    .unwrap_err();

    let launch_err = err.downcast_ref::<PipelineError>().expect("pipeline error");
    match launch_err {
        PipelineError::LaunchFailed(stderr) => {
            assert!(stderr.contains("already in use"), "got: {stderr}");
        }
        other => panic!("expected LaunchFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_launch_unwritable_root_fails_before_running() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new(&journal(), |_, _| ok_output(b""));

    let err = launch(
        &runner,
        &StdFs,
        &layout(&dir.path().join("missing")),
        &ContainerConfig::default(),
        &compose(&["docker-compose"]),
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("docker-compose.yml"), "got: {err}");
    assert!(runner.calls().is_empty());
}
