//! Application service: the batch build-and-test use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, ContainerRuntime, LocalFs, ProgressReporter};
use crate::application::services::filesystem::{CopyOutcome, copy_tree_once, ensure_directory};
use crate::application::services::remote::{RemoteCommand, run_in_container};
use crate::application::services::source::{FetchOutcome, FetchRequest, fetch};
use crate::application::services::{container, database, image};
use crate::domain::error::StepFailure;
use crate::domain::layout::{BASE_SOURCE_DIR, FILES_DIR};
use crate::domain::{
    AppOutcome, AppReport, ApplicationSpec, BatchConfig, ExecOutcome, PipelineError, PipelineStep,
    RunSummary, WorkingLayout,
};

/// Odoo launcher inside the image.
const ODOO_BIN: &str = "/home/odoo/instance/odoo/odoo.py";

/// Stops the image's own Odoo process so install and test own the databases.
#[must_use]
pub fn stop_service_command() -> Vec<String> {
    ["supervisorctl", "stop", "odoo"].map(String::from).to_vec()
}

/// Install the module into a fresh `<app>_install` database.
#[must_use]
pub fn install_command(layout: &WorkingLayout) -> Vec<String> {
    let mut argv = odoo_base_command(layout);
    argv.push("--without-demo=all".to_string());
    argv
}

/// Re-run the install with the test suite enabled.
#[must_use]
pub fn test_command(layout: &WorkingLayout) -> Vec<String> {
    let mut argv = odoo_base_command(layout);
    argv.extend(["--test-enable", "--log-level=test"].map(String::from));
    argv
}

fn odoo_base_command(layout: &WorkingLayout) -> Vec<String> {
    vec![
        ODOO_BIN.to_string(),
        "-d".to_string(),
        layout.install_db(),
        "-i".to_string(),
        layout.app().to_string(),
        "--stop-after-init".to_string(),
    ]
}

fn at<E: Into<anyhow::Error>>(step: PipelineStep) -> impl FnOnce(E) -> StepFailure {
    move |e| StepFailure {
        step,
        source: e.into(),
    }
}

/// The pipeline driver with its collaborators injected.
pub struct Pipeline<'a, R, C, F, P> {
    pub runner: &'a R,
    pub runtime: &'a C,
    pub fs: &'a F,
    pub reporter: &'a P,
    pub config: &'a BatchConfig,
}

impl<R, C, F, P> Pipeline<'_, R, C, F, P>
where
    R: CommandRunner,
    C: ContainerRuntime,
    F: LocalFs,
    P: ProgressReporter,
{
    /// Run global setup, then every application in `apps`, one at a time.
    ///
    /// A failing application is recorded in the summary and the driver moves
    /// on to the next one.
    ///
    /// # Errors
    ///
    /// Returns an error only if global setup fails (the `files` directory or
    /// the shared base-source clone); no application runs in that case.
    pub async fn run(&self, apps: &[ApplicationSpec]) -> Result<RunSummary> {
        self.global_setup().await.context("global setup failed")?;

        let mut summary = RunSummary::default();
        for app in apps {
            summary.push(self.run_app(app).await);
        }
        Ok(summary)
    }

    /// Create `files/` and fetch the shared base source into `odoo/`.
    ///
    /// # Errors
    ///
    /// Returns an error if either step fails.
    pub async fn global_setup(&self) -> Result<()> {
        let root = &self.config.workspace_root;
        ensure_directory(self.fs, &root.join(FILES_DIR))?;

        let base = &self.config.base_source;
        self.reporter
            .step(&format!("fetching base source {}...", base.repository));
        let outcome = fetch(self.runner, self.fs, FetchRequest {
            repository: &base.repository,
            dest: &root.join(BASE_SOURCE_DIR),
            git_ref: &base.git_ref,
            depth: base.depth,
        })
        .await
        .context("fetching base source")?;
        if outcome == FetchOutcome::AlreadyFetched {
            self.reporter.step("base source already present");
        }
        Ok(())
    }

    /// Run every step for one application. Never fails; failures are
    /// reported in the returned `AppReport`.
    pub async fn run_app(&self, app: &ApplicationSpec) -> AppReport {
        let layout = WorkingLayout::new(
            &self.config.workspace_root,
            &app.name,
            &self.config.tag_suffix,
        );
        self.reporter
            .step(&format!("Building instance for: {}", app.name));

        let outcome = match self.run_steps(app, &layout).await {
            Ok((install, test)) => {
                self.reporter.success(&format!(
                    "{}: install exit {}, test exit {}",
                    app.name,
                    describe_exit(&install),
                    describe_exit(&test),
                ));
                AppOutcome::Completed { install, test }
            }
            Err(failure) => {
                let error = format!("{:#}", failure.source);
                tracing::warn!(app = %app.name, step = %failure.step, error, "application aborted");
                self.reporter.warn(&format!("{}: {failure}", app.name));
                AppOutcome::Failed {
                    step: failure.step,
                    error,
                }
            }
        };
        AppReport {
            app: app.name.clone(),
            outcome,
        }
    }

    async fn run_steps(
        &self,
        app: &ApplicationSpec,
        layout: &WorkingLayout,
    ) -> Result<(ExecOutcome, ExecOutcome), StepFailure> {
        let cfg = self.config;
        let root = layout.root();

        for dir in layout.directories() {
            ensure_directory(self.fs, &dir).map_err(at(PipelineStep::PrepareDirs))?;
        }

        let copied = copy_tree_once(
            self.fs,
            &root.join(BASE_SOURCE_DIR),
            &layout.base_source_copy(),
        )
        .map_err(at(PipelineStep::CopyBaseSource))?;
        if copied == CopyOutcome::AlreadyPresent {
            tracing::debug!(app = %app.name, "base source copy already present");
        }

        let fetched = fetch(self.runner, self.fs, FetchRequest {
            repository: &app.repository,
            dest: &layout.app_checkout(),
            git_ref: &cfg.git_ref,
            depth: cfg.clone_depth,
        })
        .await
        .map_err(at(PipelineStep::FetchAppRepo))?;
        if fetched == FetchOutcome::AlreadyFetched {
            self.reporter
                .step(&format!("{} already fetched, using existing checkout", app.name));
        }

        self.fetch_dependencies(layout)
            .await
            .map_err(at(PipelineStep::FetchDependencies))?;

        image::write_image_definition(self.fs, root, &cfg.base_image, &app.name)
            .map_err(at(PipelineStep::RenderImageDef))?;

        self.reporter.step("Building image");
        image::build(
            self.runtime,
            self.reporter,
            root,
            &layout.image_tag(),
            Duration::from_secs(cfg.build_timeout_secs),
        )
        .await
        .map_err(at(PipelineStep::BuildImage))?;

        database::reset_databases(self.runner, &cfg.database, layout)
            .await
            .map_err(at(PipelineStep::ResetDbs))?;

        container::launch(
            self.runner,
            self.fs,
            layout,
            &cfg.container,
            &cfg.compose_command,
        )
        .await
        .map_err(at(PipelineStep::LaunchContainer))?;

        let container_name = layout.container_name();

        self.reporter.step("Stop odoo instance");
        let stop = stop_service_command();
        run_in_container(
            self.runtime,
            RemoteCommand {
                container: &container_name,
                argv: &stop,
                user: None,
                deadline: None,
            },
            |line| tracing::debug!(line, "supervisorctl"),
        )
        .await
        .map_err(at(PipelineStep::StopDefaultService))?;

        self.reporter.step("Install app");
        let install = self
            .remote(&container_name, &install_command(layout))
            .await
            .map_err(at(PipelineStep::Install))?;
        if !install.succeeded() {
            self.reporter.warn(&format!(
                "install exited with {}; running tests anyway",
                describe_exit(&install)
            ));
        }

        self.reporter.step("Test app");
        let test = self
            .remote(&container_name, &test_command(layout))
            .await
            .map_err(at(PipelineStep::Test))?;

        Ok((install, test))
    }

    async fn fetch_dependencies(&self, layout: &WorkingLayout) -> Result<()> {
        let (program, leading) = self
            .config
            .dependency_command
            .split_first()
            .context("dependency command is empty")?;
        let extra = layout.extra_addons_dir();
        let extra = extra.to_string_lossy();
        let mut args: Vec<&str> = leading.iter().map(String::as_str).collect();
        args.extend([extra.as_ref(), extra.as_ref()]);

        let output = self
            .runner
            .run_in(layout.root(), program, &args)
            .await
            .with_context(|| format!("failed to run {program}"))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            );
        }
        Ok(())
    }

    async fn remote(&self, container: &str, argv: &[String]) -> Result<ExecOutcome, PipelineError> {
        run_in_container(
            self.runtime,
            RemoteCommand {
                container,
                argv,
                user: Some(&self.config.container.odoo_user),
                deadline: None,
            },
            |line| self.reporter.output(line),
        )
        .await
    }
}

fn describe_exit(outcome: &ExecOutcome) -> String {
    outcome
        .exit_code
        .map_or_else(|| "unknown".to_string(), |c| c.to_string())
}
