//! Docker Engine implementation of the `ContainerRuntime` port (bollard).

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use bollard::Docker;
use bollard::errors::Error as DockerError;
use bollard::exec::{CreateExecOptions, StartExecOptions, StartExecResults};
use bollard::image::BuildImageOptions;
use bollard::models::BuildInfo;
use bytes::Bytes;
use futures_util::StreamExt as _;
use tokio::sync::mpsc;

use crate::application::ports::{BuildStream, ContainerRuntime, OutputStream};
use crate::domain::layout::IMAGE_DEFINITION_FILE;
use crate::domain::{BuildEvent, ExecutionContext, RuntimeError};

/// Upper bound bollard applies to a single API call. Builds carry their own
/// deadline and remote commands have none, so this only guards against a
/// wedged daemon.
const API_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Build-log events buffered between the daemon connection and the consumer.
const BUILD_EVENT_BUFFER: usize = 64;

/// `ContainerRuntime` backed by the local Docker daemon.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect to the local daemon socket: `DOCKER_HOST` when it names a
    /// `unix://` socket, otherwise `/var/run/docker.sock`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be configured.
    pub fn connect() -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()
            .context("cannot connect to the Docker daemon")?
            .with_timeout(API_TIMEOUT);
        Ok(Self { docker })
    }
}

impl ContainerRuntime for DockerRuntime {
    async fn build_image(
        &self,
        context_dir: &Path,
        tag: &str,
    ) -> Result<BuildStream, RuntimeError> {
        let body = tar_context(context_dir.to_path_buf()).await?;
        let options = BuildImageOptions {
            dockerfile: IMAGE_DEFINITION_FILE.to_string(),
            t: tag.to_string(),
            rm: true,
            ..Default::default()
        };
        tracing::debug!(tag, bytes = body.len(), "submitting build context");

        // bollard's build stream borrows the client; a task owning a clone
        // drives it and forwards events until the receiver goes away.
        let docker = self.docker.clone();
        let (tx, rx) = mpsc::channel(BUILD_EVENT_BUFFER);
        tokio::spawn(async move {
            let mut events = std::pin::pin!(docker.build_image(options, None, Some(body)));
            while let Some(item) = events.next().await {
                let event = item.map(build_event).map_err(runtime_error);
                if tx.send(event).await.is_err() {
                    tracing::debug!("build stream dropped by consumer");
                    break;
                }
            }
        });
        Ok(futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        })
        .boxed())
    }

    async fn exec_create(
        &self,
        container: &str,
        cmd: &[String],
        user: Option<&str>,
    ) -> Result<ExecutionContext, RuntimeError> {
        let options = CreateExecOptions::<String> {
            cmd: Some(cmd.to_vec()),
            user: user.map(str::to_string),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };
        let created = self
            .docker
            .create_exec(container, options)
            .await
            .map_err(runtime_error)?;
        Ok(ExecutionContext { id: created.id })
    }

    async fn exec_start(&self, ctx: &ExecutionContext) -> Result<OutputStream, RuntimeError> {
        let started = self
            .docker
            .start_exec(
                &ctx.id,
                Some(StartExecOptions {
                    detach: false,
                    ..Default::default()
                }),
            )
            .await
            .map_err(runtime_error)?;
        match started {
            StartExecResults::Attached { output, .. } => Ok(output
                .map(|chunk| {
                    chunk
                        .map(|log| log.into_bytes().to_vec())
                        .map_err(runtime_error)
                })
                .boxed()),
            StartExecResults::Detached => Ok(futures_util::stream::empty().boxed()),
        }
    }

    async fn exec_inspect(&self, ctx: &ExecutionContext) -> Result<Option<i64>, RuntimeError> {
        let inspected = self
            .docker
            .inspect_exec(&ctx.id)
            .await
            .map_err(runtime_error)?;
        Ok(inspected.exit_code)
    }
}

fn build_event(info: BuildInfo) -> BuildEvent {
    BuildEvent {
        stream: info.stream,
        error: info
            .error
            .or_else(|| info.error_detail.and_then(|d| d.message)),
    }
}

/// Classify a bollard error. A decoding failure reports one bad line; bollard
/// ends the stream right after it.
fn runtime_error(err: DockerError) -> RuntimeError {
    match err {
        e @ (DockerError::JsonDataError { .. } | DockerError::JsonSerdeError { .. }) => {
            RuntimeError::Malformed(e.to_string())
        }
        DockerError::DockerResponseServerError {
            status_code,
            message,
        } => RuntimeError::Api {
            status: status_code,
            message,
        },
        other => RuntimeError::Stream(other.to_string()),
    }
}

/// Pack `dir` into an uncompressed tar archive for `POST /build`.
///
/// Symlinks are archived as links, not followed.
async fn tar_context(dir: PathBuf) -> Result<Bytes, RuntimeError> {
    tokio::task::spawn_blocking(move || {
        let mut archive = tar::Builder::new(Vec::new());
        archive.follow_symlinks(false);
        archive.append_dir_all(".", &dir)?;
        archive.into_inner()
    })
    .await
    .map_err(|e| RuntimeError::Stream(format!("packing build context: {e}")))?
    .map(Bytes::from)
    .map_err(|e| RuntimeError::Stream(format!("packing build context: {e}")))
}
