//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::Output;

use anyhow::Result;
use futures_util::stream::BoxStream;

use crate::domain::{BuildEvent, ExecutionContext, RuntimeError};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
///
/// Arguments are passed as argv; implementations must never route them
/// through a shell.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process cannot be spawned or awaited.
    /// A non-zero exit is reported through `Output::status`.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;

    /// Run a program with `dir` as its working directory.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    async fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<Output>;
}

// ── Container Runtime Port ────────────────────────────────────────────────────

/// Finite, non-restartable sequence of build-log events.
pub type BuildStream = BoxStream<'static, Result<BuildEvent, RuntimeError>>;

/// Finite, non-restartable sequence of raw output chunks (stdout and stderr
/// interleaved in emission order).
pub type OutputStream = BoxStream<'static, Result<Vec<u8>, RuntimeError>>;

/// The container runtime HTTP API: image builds and exec sessions.
#[allow(async_fn_in_trait)]
pub trait ContainerRuntime {
    /// Start a fresh build of `context_dir` tagged `tag`.
    ///
    /// The build runs as the stream is polled; dropping the stream abandons it.
    async fn build_image(&self, context_dir: &Path, tag: &str)
    -> Result<BuildStream, RuntimeError>;

    /// Create an exec session for `cmd` inside `container`.
    ///
    /// `user` is the in-container user; `None` keeps the image default.
    async fn exec_create(
        &self,
        container: &str,
        cmd: &[String],
        user: Option<&str>,
    ) -> Result<ExecutionContext, RuntimeError>;

    /// Start an exec session and attach to its output.
    async fn exec_start(&self, ctx: &ExecutionContext) -> Result<OutputStream, RuntimeError>;

    /// Exit code of a finished exec session, if the runtime knows it.
    async fn exec_inspect(&self, ctx: &ExecutionContext) -> Result<Option<i64>, RuntimeError>;
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Abstracts the local filesystem operations the pipeline performs.
///
/// Methods return `std::io::Result` so callers can classify failures by
/// `ErrorKind` instead of by message.
pub trait LocalFs {
    /// Create a single directory; the parent must exist.
    fn create_dir(&self, path: &Path) -> std::io::Result<()>;

    /// `true` if `path` is a directory with at least one entry.
    fn is_non_empty_dir(&self, path: &Path) -> bool;

    /// Recursively copy `src` to `dest`; fails with `AlreadyExists` if
    /// `dest` exists.
    fn copy_tree(&self, src: &Path, dest: &Path) -> std::io::Result<()>;

    /// Create or truncate `path` with `content`.
    fn write(&self, path: &Path, content: &str) -> std::io::Result<()>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Relay one line of streamed build or remote command output.
    fn output(&self, line: &str);
}
