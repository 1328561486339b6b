//! Idempotent directory creation and one-shot tree copies.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::io::ErrorKind;
use std::path::Path;

use crate::application::ports::LocalFs;
use crate::domain::{ExternalErrorKind, PipelineError};

/// Map an io error onto the pipeline's tolerance classes.
#[must_use]
pub fn classify_io(err: &std::io::Error) -> ExternalErrorKind {
    match err.kind() {
        ErrorKind::AlreadyExists => ExternalErrorKind::AlreadyExists,
        ErrorKind::NotFound => ExternalErrorKind::NotFound,
        _ => ExternalErrorKind::Other,
    }
}

/// Create `path` unless it already exists.
///
/// # Errors
///
/// Returns `PipelineError::Io` for anything but "already exists"
/// (missing parent, permission denied, path is a file, ...).
pub fn ensure_directory(fs: &impl LocalFs, path: &Path) -> Result<(), PipelineError> {
    match fs.create_dir(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "created directory");
            Ok(())
        }
        Err(e) if classify_io(&e) == ExternalErrorKind::AlreadyExists => {
            tracing::debug!(path = %path.display(), "directory already exists");
            Ok(())
        }
        Err(source) => Err(PipelineError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

/// What [`copy_tree_once`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    AlreadyPresent,
}

/// Copy `src` to `dest` unless `dest` already exists. An existing copy is
/// never refreshed.
///
/// # Errors
///
/// Returns `PipelineError::Io` for anything but "already exists".
pub fn copy_tree_once(
    fs: &impl LocalFs,
    src: &Path,
    dest: &Path,
) -> Result<CopyOutcome, PipelineError> {
    match fs.copy_tree(src, dest) {
        Ok(()) => Ok(CopyOutcome::Copied),
        Err(e) if classify_io(&e) == ExternalErrorKind::AlreadyExists => {
            Ok(CopyOutcome::AlreadyPresent)
        }
        Err(source) => Err(PipelineError::Io {
            path: dest.display().to_string(),
            source,
        }),
    }
}
