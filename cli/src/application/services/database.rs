//! Drop-then-create of the per-application install and test databases.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::application::ports::CommandRunner;
use crate::domain::config::DatabaseConfig;
use crate::domain::{ExternalError, ExternalErrorKind, WorkingLayout};

/// `psql -v VERBOSITY=verbose` prefixes errors with their SQLSTATE.
static SQLSTATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"ERROR:\s+([0-9A-Z]{5}):").expect("valid regex")
});

/// `invalid_catalog_name`: the database does not exist.
const SQLSTATE_UNDEFINED_DATABASE: &str = "3D000";
/// `duplicate_database`.
const SQLSTATE_DUPLICATE_DATABASE: &str = "42P04";

/// One administrative statement and whether "does not exist" is acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminStatement {
    pub sql: String,
    pub tolerate_missing: bool,
}

/// The four statements of a reset, in execution order.
#[must_use]
pub fn reset_statements(layout: &WorkingLayout) -> [AdminStatement; 4] {
    let install = quote_ident(&layout.install_db());
    let test = quote_ident(&layout.test_db());
    let drop = |db: &str| AdminStatement {
        sql: format!("DROP DATABASE IF EXISTS {db}"),
        tolerate_missing: true,
    };
    let create = |db: &str| AdminStatement {
        sql: format!("CREATE DATABASE {db}"),
        tolerate_missing: false,
    };
    [drop(&install), drop(&test), create(&install), create(&test)]
}

/// Drop and recreate `<app>_install` and `<app>_test`.
///
/// Statements run independently (no transaction). A failure after a drop
/// leaves that database missing; the caller treats it as fatal.
///
/// # Errors
///
/// Returns an [`ExternalError`] for any failure other than a drop of a
/// database that does not exist.
pub async fn reset_databases(
    runner: &impl CommandRunner,
    db: &DatabaseConfig,
    layout: &WorkingLayout,
) -> Result<()> {
    for stmt in reset_statements(layout) {
        match run_admin_sql(runner, db, &stmt.sql).await {
            Ok(()) => {}
            Err(e) if stmt.tolerate_missing && e.kind == ExternalErrorKind::NotFound => {
                tracing::debug!(sql = %stmt.sql, "database already absent");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

async fn run_admin_sql(
    runner: &impl CommandRunner,
    db: &DatabaseConfig,
    sql: &str,
) -> Result<(), ExternalError> {
    let mut args = vec!["-X", "-v", "ON_ERROR_STOP=1", "-v", "VERBOSITY=verbose"];
    if let Some(host) = db.host.as_deref() {
        args.extend(["-h", host]);
    }
    if let Some(user) = db.user.as_deref() {
        args.extend(["-U", user]);
    }
    args.extend(["-c", sql, db.admin_db.as_str()]);

    tracing::debug!(sql, "running psql");
    let output = runner
        .run("psql", &args)
        .await
        .context("failed to run psql")
        .map_err(|e| ExternalError::other("psql", format!("{e:#}")))?;
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(ExternalError::new(
        classify_psql_failure(&stderr),
        format!("psql -c '{sql}'"),
        stderr.trim(),
    ))
}

/// Classify a failed `psql` run from the SQLSTATE in its verbose error.
///
/// Falls back to the message text only when no SQLSTATE is printed (older
/// servers, or `VERBOSITY` ignored).
#[must_use]
pub fn classify_psql_failure(stderr: &str) -> ExternalErrorKind {
    match SQLSTATE_RE.captures(stderr).and_then(|c| c.get(1)) {
        Some(code) if code.as_str() == SQLSTATE_UNDEFINED_DATABASE => ExternalErrorKind::NotFound,
        Some(code) if code.as_str() == SQLSTATE_DUPLICATE_DATABASE => {
            ExternalErrorKind::AlreadyExists
        }
        Some(_) => ExternalErrorKind::Other,
        None if stderr.contains("ERROR:") && stderr.contains("does not exist") => {
            ExternalErrorKind::NotFound
        }
        None => ExternalErrorKind::Other,
    }
}

/// Quote a PostgreSQL identifier.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
