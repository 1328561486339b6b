//! Source fetcher: clone, skip existing checkouts, classify failures.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use odoo_ci::application::services::source::{FetchOutcome, FetchRequest, fetch};
use odoo_ci::domain::{ExternalError, ExternalErrorKind};
use odoo_ci::infra::fs::StdFs;

use crate::mocks::{ScriptedRunner, err_output, journal};

fn request(dest: &std::path::Path) -> FetchRequest<'_> {
    FetchRequest {
        repository: "git@github.com:Vauxoo/yoytec.git",
        dest,
        git_ref: "8.0",
        depth: 1,
    }
}

#[tokio::test]
async fn test_fetch_clones_single_branch_shallow() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("yoytec");
    let runner = ScriptedRunner::succeeding(&journal());

    let outcome = fetch(&runner, &StdFs, request(&dest)).await.expect("clone");

    assert_eq!(outcome, FetchOutcome::Cloned);
    let calls = runner.calls_to("git");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args, vec![
        "clone".to_string(),
        "-b".to_string(),
        "8.0".to_string(),
        "--single-branch".to_string(),
        "--depth=1".to_string(),
        "git@github.com:Vauxoo/yoytec.git".to_string(),
        dest.to_string_lossy().to_string(),
    ]);
}

#[tokio::test]
async fn test_fetch_existing_checkout_skips_git_and_keeps_content() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("yoytec");
    std::fs::create_dir(&dest).unwrap();
    std::fs::write(dest.join("local_edit.py"), "mine").unwrap();
    let runner = ScriptedRunner::succeeding(&journal());

    let outcome = fetch(&runner, &StdFs, request(&dest)).await.expect("skip");

    assert_eq!(outcome, FetchOutcome::AlreadyFetched);
    assert!(runner.calls().is_empty(), "git must not run");
    assert_eq!(std::fs::read_to_string(dest.join("local_edit.py")).unwrap(), "mine");
    assert!(!dest.join("__manifest__.py").exists());
}

#[tokio::test]
async fn test_fetch_empty_directory_still_clones() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("yoytec");
    std::fs::create_dir(&dest).unwrap();
    let runner = ScriptedRunner::succeeding(&journal());

    let outcome = fetch(&runner, &StdFs, request(&dest)).await.expect("clone");
    assert_eq!(outcome, FetchOutcome::Cloned);
    assert_eq!(runner.calls_to("git").len(), 1);
}

#[tokio::test]
async fn test_fetch_racing_destination_is_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("yoytec");
    let runner = ScriptedRunner::new(&journal(), |_, _| {
        err_output(
            128,
            b"fatal: destination path 'yoytec' already exists and is not an empty directory.\n",
        )
    });

    let outcome = fetch(&runner, &StdFs, request(&dest)).await.expect("tolerated");
    assert_eq!(outcome, FetchOutcome::AlreadyFetched);
}

#[tokio::test]
async fn test_fetch_auth_failure_is_fatal_with_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("yoytec");
    let runner = ScriptedRunner::new(&journal(), |_, _| {
        err_output(128, b"git@github.com: Permission denied (publickey).\n")
    });

    let err = fetch(&runner, &StdFs, request(&dest)).await.unwrap_err();
    let external = err
        .downcast_ref::<ExternalError>()
        .expect("classified external error");
    assert_eq!(external.kind, ExternalErrorKind::Other);
    assert!(external.detail.contains("Permission denied"), "got: {err}");
}
