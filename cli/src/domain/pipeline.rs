//! Pipeline states and run reporting types.
//!
//! Pure types only: no I/O, no async.

use std::fmt;

use crate::domain::config::AppName;
use crate::domain::stream::ExecOutcome;

/// Per-application pipeline states, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineStep {
    PrepareDirs,
    CopyBaseSource,
    FetchAppRepo,
    FetchDependencies,
    RenderImageDef,
    BuildImage,
    ResetDbs,
    LaunchContainer,
    StopDefaultService,
    Install,
    Test,
}

impl PipelineStep {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PrepareDirs => "PREPARE_DIRS",
            Self::CopyBaseSource => "COPY_BASE_SOURCE",
            Self::FetchAppRepo => "FETCH_APP_REPO",
            Self::FetchDependencies => "FETCH_DEPENDENCIES",
            Self::RenderImageDef => "RENDER_IMAGE_DEF",
            Self::BuildImage => "BUILD_IMAGE",
            Self::ResetDbs => "RESET_DBS",
            Self::LaunchContainer => "LAUNCH_CONTAINER",
            Self::StopDefaultService => "STOP_DEFAULT_SERVICE",
            Self::Install => "INSTALL",
            Self::Test => "TEST",
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of one application's pass.
#[derive(Debug)]
pub enum AppOutcome {
    /// Every step ran. Exit codes are reported as observed, not judged.
    Completed {
        install: ExecOutcome,
        test: ExecOutcome,
    },
    /// A fatal error stopped the pipeline at `step`.
    Failed { step: PipelineStep, error: String },
}

/// Outcome of one application.
#[derive(Debug)]
pub struct AppReport {
    pub app: AppName,
    pub outcome: AppOutcome,
}

impl AppReport {
    /// `true` when the pipeline ran to the end of `TEST`.
    #[must_use]
    pub fn completed(&self) -> bool {
        matches!(self.outcome, AppOutcome::Completed { .. })
    }

    /// `true` when the pipeline completed and both remote commands exited 0.
    #[must_use]
    pub fn passed(&self) -> bool {
        match &self.outcome {
            AppOutcome::Completed { install, test } => install.succeeded() && test.succeeded(),
            AppOutcome::Failed { .. } => false,
        }
    }
}

/// Aggregated result of a whole run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<AppReport>,
}

impl RunSummary {
    pub fn push(&mut self, report: AppReport) {
        self.reports.push(report);
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| !r.completed()).count()
    }

    /// Whether the run counts as successful.
    ///
    /// With `strict`, a non-zero install or test exit code also fails the run.
    #[must_use]
    pub fn is_success(&self, strict: bool) -> bool {
        if strict {
            self.reports.iter().all(AppReport::passed)
        } else {
            self.reports.iter().all(AppReport::completed)
        }
    }
}
