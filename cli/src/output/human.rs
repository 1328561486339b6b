//! Human-readable rendering of a finished run.

use crate::domain::{AppOutcome, ExecOutcome, RunSummary};
use crate::output::OutputContext;

/// Render one line per application, then a totals line.
pub fn render_summary(ctx: &OutputContext, summary: &RunSummary) {
    println!();
    ctx.header("Summary:");
    for report in &summary.reports {
        let name = report.app.as_str();
        match &report.outcome {
            AppOutcome::Completed { install, test } => {
                let line = format!(
                    "{name}: install {}, test {}",
                    exit_label(install),
                    exit_label(test)
                );
                if report.passed() {
                    ctx.success(&line);
                } else {
                    ctx.warn(&line);
                }
            }
            AppOutcome::Failed { step, error } => {
                ctx.error(&format!("{name}: {step} failed: {error}"));
            }
        }
    }
    let total = summary.reports.len();
    ctx.kv(
        "Applications:",
        &format!("{total} run, {} failed", summary.failed()),
    );
}

/// `exit 0`, `exit 1`, or `exit unknown`.
#[must_use]
pub fn exit_label(outcome: &ExecOutcome) -> String {
    match outcome.exit_code {
        Some(code) => format!("exit {code}"),
        None => "exit unknown".to_string(),
    }
}
