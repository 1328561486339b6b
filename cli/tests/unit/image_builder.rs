//! Image builder: build-log relay, error events and the build deadline.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt as _;
use odoo_ci::application::ports::{BuildStream, ContainerRuntime, OutputStream};
use odoo_ci::application::services::image::{build, write_image_definition};
use odoo_ci::domain::{AppName, BuildEvent, ExecutionContext, PipelineError, RuntimeError};
use odoo_ci::infra::fs::StdFs;

use crate::mocks::{FakeRuntime, RecordingReporter, entries, journal, stream_event};

const TIMEOUT: Duration = Duration::from_secs(3600);

fn runtime_with(events: Vec<Result<BuildEvent, RuntimeError>>) -> FakeRuntime {
    let script = std::sync::Mutex::new(Some(events));
    FakeRuntime::new(
        &journal(),
        move |_| script.lock().expect("lock").take().unwrap_or_default(),
        |_| (Vec::new(), Some(0)),
    )
}

#[tokio::test]
async fn test_build_relays_trimmed_lines_in_order() {
    let j = journal();
    let runtime = FakeRuntime::healthy(&j);
    let reporter = RecordingReporter::default();

    let report = build(&runtime, &reporter, Path::new("."), "demo80", TIMEOUT)
        .await
        .expect("build");

    assert_eq!(entries(&j), vec!["build demo80"]);
    assert_eq!(reporter.outputs(), vec![
        "Step 1/9 : FROM base (demo80)",
        "Successfully built",
    ]);
    assert_eq!(report.events, 2);
    assert_eq!(report.skipped, 0);
}

#[tokio::test]
async fn test_build_skips_blank_and_undecodable_events() {
    let runtime = runtime_with(vec![
        Ok(stream_event("Step 1/2\n")),
        Ok(BuildEvent::default()),
        Ok(stream_event("   \n")),
        Err(RuntimeError::Malformed("expected value at line 1".to_string())),
        Ok(stream_event("Step 2/2\n")),
    ]);
    let reporter = RecordingReporter::default();

    let report = build(&runtime, &reporter, Path::new("."), "demo80", TIMEOUT)
        .await
        .expect("malformed lines do not fail the build");

    assert_eq!(reporter.outputs(), vec!["Step 1/2", "Step 2/2"]);
    assert_eq!(report.events, 4);
    assert_eq!(report.skipped, 1);
}

#[tokio::test]
async fn test_build_ending_on_undecodable_line_fails() {
    let runtime = runtime_with(vec![
        Ok(stream_event("Step 1/9 : FROM base\n")),
        Err(RuntimeError::Malformed("expected value at line 1".to_string())),
    ]);
    let reporter = RecordingReporter::default();

    let err = build(&runtime, &reporter, Path::new("."), "demo80", TIMEOUT)
        .await
        .unwrap_err();

    match err {
        PipelineError::BuildFailed { tag, message } => {
            assert_eq!(tag, "demo80");
            assert!(message.contains("status unknown"), "got: {message}");
        }
        other => panic!("expected BuildFailed, got {other:?}"),
    }
    assert_eq!(reporter.outputs(), vec!["Step 1/9 : FROM base"]);
}

#[tokio::test]
async fn test_build_error_event_fails_with_message() {
    let runtime = runtime_with(vec![
        Ok(stream_event("Step 1/9 : FROM vauxoo/odoo-80-image-shippable-auto\n")),
        Ok(BuildEvent {
            stream: None,
            error: Some("The command '/bin/sh -c bash install_deps.sh' returned a non-zero code: 1\n".to_string()),
        }),
        Ok(stream_event("never relayed\n")),
    ]);
    let reporter = RecordingReporter::default();

    let err = build(&runtime, &reporter, Path::new("."), "demo80", TIMEOUT)
        .await
        .unwrap_err();

    match err {
        PipelineError::BuildFailed { tag, message } => {
            assert_eq!(tag, "demo80");
            assert!(message.ends_with("returned a non-zero code: 1"), "got: {message}");
        }
        other => panic!("expected BuildFailed, got {other:?}"),
    }
    assert_eq!(reporter.outputs().len(), 1);
}

#[tokio::test]
async fn test_build_api_error_fails() {
    let runtime = runtime_with(vec![Err(RuntimeError::Api {
        status: 500,
        message: "pull access denied".to_string(),
    })]);

    let err = build(
        &runtime,
        &RecordingReporter::default(),
        Path::new("."),
        "demo80",
        TIMEOUT,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PipelineError::BuildFailed { .. }));
    assert!(err.to_string().contains("pull access denied"), "got: {err}");
}

/// A build that starts and then never reports anything.
struct StalledBuild;

impl ContainerRuntime for StalledBuild {
    async fn build_image(&self, _: &Path, _: &str) -> Result<BuildStream, RuntimeError> {
        Ok(futures_util::stream::iter([Ok(stream_event("Step 1/9\n"))])
            .chain(futures_util::stream::pending())
            .boxed())
    }

    async fn exec_create(
        &self,
        _: &str,
        _: &[String],
        _: Option<&str>,
    ) -> Result<ExecutionContext, RuntimeError> {
        Err(RuntimeError::Stream("unused".to_string()))
    }

    async fn exec_start(&self, _: &ExecutionContext) -> Result<OutputStream, RuntimeError> {
        Err(RuntimeError::Stream("unused".to_string()))
    }

    async fn exec_inspect(&self, _: &ExecutionContext) -> Result<Option<i64>, RuntimeError> {
        Ok(None)
    }
}

#[tokio::test]
async fn test_build_times_out() {
    let reporter = RecordingReporter::default();

    let err = build(
        &StalledBuild,
        &reporter,
        Path::new("."),
        "demo80",
        Duration::from_millis(50),
    )
    .await
    .unwrap_err();

    assert!(
        matches!(err, PipelineError::BuildTimedOut { ref tag, .. } if tag == "demo80"),
        "got: {err:?}"
    );
    assert_eq!(reporter.outputs(), vec!["Step 1/9"]);
}

#[test]
fn test_write_image_definition_replaces_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Dockerfile"), "stale").unwrap();
    let app = AppName::parse("demo").unwrap();

    write_image_definition(&StdFs, dir.path(), "vauxoo/odoo-80-image", &app).expect("write");

    let content = std::fs::read_to_string(dir.path().join("Dockerfile")).unwrap();
    assert!(content.contains("FROM vauxoo/odoo-80-image"));
    assert!(content.contains("COPY files/demo/instance /home/odoo/instance"));
    assert!(!content.contains("stale"));
}

#[test]
fn test_write_image_definition_reports_path_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing");
    let app = AppName::parse("demo").unwrap();

    let err = write_image_definition(&StdFs, &missing, "base", &app).unwrap_err();

    assert!(matches!(err, PipelineError::Io { .. }));
    assert!(err.to_string().contains("missing"), "got: {err}");
}
