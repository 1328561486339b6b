//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::app::{AppContext, AppFlags};
use crate::commands;

/// Build, install and test a batch of Odoo instances in containers
#[derive(Parser)]
#[command(name = "odoo-ci", version)]
pub struct Cli {
    #[command(flatten)]
    pub run: commands::run::RunArgs,

    /// Suppress progress messages (build and test output is still shown)
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output (any non-empty `NO_COLOR` also disables it)
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,
}

impl Cli {
    /// Execute the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or global setup fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            run,
            quiet,
            no_color,
        } = self;
        let app = AppContext::new(&AppFlags {
            config: run.config.clone(),
            no_color,
            quiet,
        })?;
        commands::run::run(&app, &run).await
    }
}
