//! Image definition output and image builds.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt as _;
use tokio::time::{Instant, timeout_at};

use crate::application::ports::{ContainerRuntime, LocalFs, ProgressReporter};
use crate::domain::layout::IMAGE_DEFINITION_FILE;
use crate::domain::templates::render_image_definition;
use crate::domain::{AppName, PipelineError};

/// Render the application's `Dockerfile` into `root`, replacing any previous one.
///
/// # Errors
///
/// Returns `PipelineError::Io` if the file cannot be written.
pub fn write_image_definition(
    fs: &impl LocalFs,
    root: &Path,
    base_image: &str,
    app: &AppName,
) -> Result<(), PipelineError> {
    let path = root.join(IMAGE_DEFINITION_FILE);
    fs.write(&path, &render_image_definition(base_image, app))
        .map_err(|source| PipelineError::Io {
            path: path.display().to_string(),
            source,
        })
}

/// Counters from one consumed build stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    pub events: usize,
    /// Lines the runtime sent that could not be decoded.
    pub skipped: usize,
}

/// Build `context_dir` as `tag`, relaying build output as it arrives.
///
/// The whole build, including submitting the context, must finish before
/// `timeout` elapses.
///
/// # Errors
///
/// Returns `BuildFailed` if the runtime reports an error event or a
/// non-decoding failure, or if the output ends on an undecodable line, and
/// `BuildTimedOut` past the deadline.
pub async fn build(
    runtime: &impl ContainerRuntime,
    reporter: &impl ProgressReporter,
    context_dir: &Path,
    tag: &str,
    timeout: Duration,
) -> Result<BuildReport, PipelineError> {
    let deadline = Instant::now() + timeout;
    let timed_out = || PipelineError::BuildTimedOut {
        tag: tag.to_string(),
        secs: timeout.as_secs(),
    };
    let failed = |message: String| PipelineError::BuildFailed {
        tag: tag.to_string(),
        message,
    };

    let mut stream = timeout_at(deadline, runtime.build_image(context_dir, tag))
        .await
        .map_err(|_| timed_out())?
        .map_err(|e| failed(e.to_string()))?;

    let mut report = BuildReport::default();
    let mut last_malformed = false;
    while let Some(item) = timeout_at(deadline, stream.next())
        .await
        .map_err(|_| timed_out())?
    {
        last_malformed = false;
        match item {
            Ok(event) => {
                report.events += 1;
                if let Some(error) = event.error {
                    return Err(failed(error.trim().to_string()));
                }
                if let Some(line) = event.message() {
                    reporter.output(line);
                }
            }
            Err(e) if e.is_malformed() => {
                report.skipped += 1;
                last_malformed = true;
                tracing::warn!(tag, error = %e, "skipping undecodable build output");
            }
            Err(e) => return Err(failed(e.to_string())),
        }
    }
    // A decoder that gives up on a bad line also drops everything after it,
    // including a final error event.
    if last_malformed {
        return Err(failed(
            "build output ended at an undecodable line; build status unknown".to_string(),
        ));
    }
    tracing::debug!(tag, events = report.events, skipped = report.skipped, "build finished");
    Ok(report)
}
