//! Marker and text styles for terminal output.

use owo_colors::Style;

/// One style per kind of line the tool prints. `Default` is uncolored.
#[derive(Debug, Default, Clone, Copy)]
pub struct Styles {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub info: Style,
    /// `→` in front of pipeline steps.
    pub step: Style,
    /// Keys in the run summary.
    pub dim: Style,
    pub header: Style,
}

impl Styles {
    /// ANSI-colored variant, used only when stdout is a terminal.
    #[must_use]
    pub fn colored() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            info: Style::new().blue(),
            step: Style::new().cyan(),
            dim: Style::new().dimmed(),
            header: Style::new().bold(),
        }
    }
}
