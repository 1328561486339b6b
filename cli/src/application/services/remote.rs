//! Run a command inside a running container and stream its output.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use futures_util::StreamExt as _;
use tokio::time::{Instant, timeout_at};

use crate::application::ports::ContainerRuntime;
use crate::domain::{ExecOutcome, LineSplitter, PipelineError, RuntimeError};

/// What to run, where and as whom.
#[derive(Debug, Clone, Copy)]
pub struct RemoteCommand<'a> {
    pub container: &'a str,
    pub argv: &'a [String],
    /// `None` runs as the image's default user.
    pub user: Option<&'a str>,
    /// Optional bound on the whole command; `None` waits indefinitely.
    pub deadline: Option<Instant>,
}

/// Create an exec session, start it, and hand every output line to
/// `on_line` in emission order until the command terminates.
///
/// The remote exit code is surfaced in the returned [`ExecOutcome`]; a
/// non-zero exit is not an error here.
///
/// # Errors
///
/// Returns `PipelineError::Runtime` if the session cannot be created,
/// started or read, or if `deadline` passes.
pub async fn run_in_container(
    runtime: &impl ContainerRuntime,
    cmd: RemoteCommand<'_>,
    mut on_line: impl FnMut(&str),
) -> Result<ExecOutcome, PipelineError> {
    let ctx = runtime
        .exec_create(cmd.container, cmd.argv, cmd.user)
        .await?;
    tracing::debug!(exec = %ctx.id, container = cmd.container, argv = ?cmd.argv, "exec created");
    let mut stream = runtime.exec_start(&ctx).await?;

    let mut splitter = LineSplitter::new();
    let mut lines = 0usize;
    loop {
        let next = match cmd.deadline {
            Some(deadline) => timeout_at(deadline, stream.next()).await.map_err(|_| {
                RuntimeError::Stream(format!("exec {} exceeded its deadline", ctx.id))
            })?,
            None => stream.next().await,
        };
        let Some(chunk) = next else { break };
        for line in splitter.push(&chunk?) {
            on_line(&line);
            lines += 1;
        }
    }
    if let Some(rest) = splitter.finish() {
        on_line(&rest);
        lines += 1;
    }

    let exit_code = runtime.exec_inspect(&ctx).await?;
    tracing::debug!(exec = %ctx.id, lines, ?exit_code, "exec finished");
    Ok(ExecOutcome { lines, exit_code })
}
