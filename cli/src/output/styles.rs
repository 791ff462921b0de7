//! Output styles using owo-colors stylesheet pattern

use owo_colors::Style;

/// Centralized stylesheet for CLI output colors.
#[derive(Default, Clone)]
pub struct Styles {
    /// Success messages and `Running` (green)
    pub success: Style,
    /// Warning messages and `Stopped` (yellow)
    pub warning: Style,
    /// Error messages and `Dead` (red)
    pub error: Style,
    /// Info messages (blue)
    pub info: Style,
    /// Dimmed/secondary text, e.g. endpoints
    pub dim: Style,
    /// Instance names
    pub bold: Style,
    /// Suggested follow-up commands
    pub hint: Style,
}

impl Styles {
    /// Apply colors to the stylesheet.
    pub fn colorize(&mut self) {
        self.success = Style::new().green();
        self.warning = Style::new().yellow();
        self.error = Style::new().red();
        self.info = Style::new().blue();
        self.dim = Style::new().dimmed();
        self.bold = Style::new().bold();
        self.hint = Style::new().cyan();
    }
}
