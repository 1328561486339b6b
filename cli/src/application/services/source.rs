//! Shallow single-branch clones that treat an existing checkout as done.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, LocalFs};
use crate::domain::{ExternalError, ExternalErrorKind};

/// git's wording when the clone target is occupied. Only consulted when the
/// filesystem probe before the clone said the target was free (a racing
/// writer), since git reports every fatal error with exit code 128.
const GIT_DEST_OCCUPIED: &str = "already exists and is not an empty directory";

/// What [`fetch`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Cloned,
    /// A non-empty checkout was already there; it was left untouched.
    AlreadyFetched,
}

/// A clone request.
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub repository: &'a str,
    pub dest: &'a Path,
    pub git_ref: &'a str,
    pub depth: u32,
}

/// Clone `req.repository` at `req.git_ref` into `req.dest`.
///
/// # Errors
///
/// Returns an [`ExternalError`] of kind `Other` (with git's stderr) for
/// network, auth or ref failures, or an error if git cannot be spawned.
pub async fn fetch(
    runner: &impl CommandRunner,
    fs: &impl LocalFs,
    req: FetchRequest<'_>,
) -> Result<FetchOutcome> {
    if fs.is_non_empty_dir(req.dest) {
        tracing::debug!(dest = %req.dest.display(), "checkout present, skipping clone");
        return Ok(FetchOutcome::AlreadyFetched);
    }

    let depth = format!("--depth={}", req.depth);
    let dest = req.dest.to_string_lossy();
    let args = [
        "clone",
        "-b",
        req.git_ref,
        "--single-branch",
        depth.as_str(),
        req.repository,
        dest.as_ref(),
    ];
    tracing::debug!(?args, "running git");
    let output = runner
        .run("git", &args)
        .await
        .context("failed to run git")?;

    if output.status.success() {
        return Ok(FetchOutcome::Cloned);
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    match classify_clone_failure(&stderr) {
        ExternalErrorKind::AlreadyExists => Ok(FetchOutcome::AlreadyFetched),
        kind => Err(ExternalError::new(kind, "git clone", stderr.trim()).into()),
    }
}

/// Last-resort message classification of a failed `git clone`.
#[must_use]
pub fn classify_clone_failure(stderr: &str) -> ExternalErrorKind {
    if stderr.contains(GIT_DEST_OCCUPIED) {
        ExternalErrorKind::AlreadyExists
    } else {
        ExternalErrorKind::Other
    }
}
