//! Argument parsing, help and version output.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

pub fn odoo_ci() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("odoo-ci"));
    cmd.env("NO_COLOR", "1").env_remove("ODOO_CI_CONFIG");
    cmd
}

#[test]
fn test_help_flag_shows_usage_and_options() {
    odoo_ci()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--only"))
        .stdout(predicate::str::contains("--strict"));
}

#[test]
fn test_help_describes_the_tool() {
    odoo_ci()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Build, install and test a batch of Odoo instances in containers",
        ));
}

#[test]
fn test_version_flag_shows_version() {
    odoo_ci()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("odoo-ci 0.1.0"));
}

#[test]
fn test_unknown_flag_is_usage_error() {
    odoo_ci()
        .arg("--frobnicate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unexpected argument"));
}

#[test]
fn test_config_flag_requires_value() {
    odoo_ci().arg("--config").assert().code(2);
}

#[test]
fn test_no_color_accepts_conventional_values() {
    for value in ["1", "yes", ""] {
        odoo_ci()
            .env("NO_COLOR", value)
            .args(["--config", "/nonexistent/odoo-ci.yaml"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("invalid value").not())
            .stderr(predicate::str::contains("/nonexistent/odoo-ci.yaml"));
    }
}

#[test]
fn test_no_color_flag_is_accepted() {
    odoo_ci()
        .env_remove("NO_COLOR")
        .args(["--no-color", "--config", "/nonexistent/odoo-ci.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("/nonexistent/odoo-ci.yaml"));
}
