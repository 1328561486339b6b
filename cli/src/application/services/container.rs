//! Bring up one application container through the composition CLI.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, LocalFs};
use crate::domain::config::ContainerConfig;
use crate::domain::layout::COMPOSITION_FILE;
use crate::domain::templates::render_composition;
use crate::domain::{PipelineError, WorkingLayout};

/// Write `docker-compose.yml` for `layout` and run `<compose> up -d` in the
/// workspace root.
///
/// `compose` is the configured program plus leading arguments.
///
/// # Errors
///
/// Returns `PipelineError::Io` if the file cannot be written and
/// `PipelineError::LaunchFailed` (with the tool's stderr verbatim) if the
/// compose command exits non-zero.
pub async fn launch(
    runner: &impl CommandRunner,
    fs: &impl LocalFs,
    layout: &WorkingLayout,
    container: &ContainerConfig,
    compose: &[String],
) -> Result<()> {
    let path = layout.root().join(COMPOSITION_FILE);
    fs.write(&path, &render_composition(layout, container))
        .map_err(|source| PipelineError::Io {
            path: path.display().to_string(),
            source,
        })?;

    let (program, leading) = compose
        .split_first()
        .context("compose command is empty")?;
    let mut args: Vec<&str> = leading.iter().map(String::as_str).collect();
    args.extend(["up", "-d"]);

    tracing::debug!(program, ?args, container = %layout.container_name(), "starting container");
    let output = runner
        .run_in(layout.root(), program, &args)
        .await
        .with_context(|| format!("failed to run {program}"))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PipelineError::LaunchFailed(stderr.trim().to_string()).into());
    }
    Ok(())
}
