//! Application context: unified state passed to the command handler.
//!
//! Constructs the production implementations of every port once, so the
//! command handler only wires them into the pipeline.

use std::path::PathBuf;

use anyhow::Result;

use crate::domain::BatchConfig;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlConfigLoader;
use crate::infra::docker::DockerRuntime;
use crate::infra::fs::StdFs;
use crate::output::{OutputContext, TerminalReporter};

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Configuration file; built-in batch when `None`.
    pub config: Option<PathBuf>,
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Unified application context passed to the command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Validated batch configuration.
    pub config: BatchConfig,
    /// Process runner for git, psql, compose and the dependency script.
    pub runner: TokioCommandRunner,
    /// Docker Engine API client.
    pub runtime: DockerRuntime,
    /// Local filesystem.
    pub fs: StdFs,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the Docker
    /// client cannot be configured.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let config = YamlConfigLoader::new(flags.config.clone()).load()?;
        Ok(Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            config,
            runner: TokioCommandRunner::new(),
            runtime: DockerRuntime::connect()?,
            fs: StdFs,
        })
    }

    /// Progress reporter bound to this context's output settings.
    #[must_use]
    pub fn terminal_reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }
}
