//! Run command: build, install and test every selected application.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::pipeline::Pipeline;
use crate::output::render_summary;

/// Arguments for the run command.
#[derive(Args, Default)]
pub struct RunArgs {
    /// Batch configuration file (YAML); the built-in batch is used when unset
    #[arg(long, value_name = "PATH", env = "ODOO_CI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Only process this application (repeatable)
    #[arg(long = "only", value_name = "APP")]
    pub only: Vec<String>,

    /// Fail the run when an install or test command exits non-zero
    #[arg(long)]
    pub strict: bool,
}

/// Entry point for `odoo-ci`.
///
/// # Errors
///
/// Returns an error if `--only` names an unknown application or global
/// setup fails. Per-application failures are reported in the summary and
/// reflected in the exit code.
pub async fn run(app: &AppContext, args: &RunArgs) -> Result<ExitCode> {
    let apps = app.config.select(&args.only)?;
    let reporter = app.terminal_reporter();
    app.output.info(&format!(
        "{} application(s) in {}",
        apps.len(),
        app.config.workspace_root.display()
    ));

    let pipeline = Pipeline {
        runner: &app.runner,
        runtime: &app.runtime,
        fs: &app.fs,
        reporter: &reporter,
        config: &app.config,
    };
    let summary = pipeline.run(&apps).await?;

    render_summary(&app.output, &summary);
    if summary.is_success(args.strict) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
