//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;
use procserv_common::{InstanceState, StatusLine, StatusOutput};

use crate::output::OutputContext;

/// Renders status as one line per instance.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// `<name> Running\t<endpoints>`, `<name> Dead` or `<name> Stopped`.
    #[must_use]
    pub fn status_line(&self, line: &StatusLine) -> String {
        let styles = &self.ctx.styles;
        let state_style = match line.state {
            InstanceState::Running => styles.success,
            InstanceState::Dead => styles.error,
            InstanceState::Stopped => styles.warning,
        };
        let mut out = format!(
            "{} {}",
            line.name.style(styles.bold),
            line.state.as_str().style(state_style)
        );
        if line.state == InstanceState::Running {
            out.push('\t');
            out.push_str(&line.endpoints.join(" ").style(styles.dim).to_string());
        }
        out
    }

    /// Print every line of `status`.
    pub fn render_status(&self, status: &StatusOutput) {
        if status.instances.is_empty() {
            self.ctx.info("No enabled instances");
            return;
        }
        for line in &status.instances {
            println!("{}", self.status_line(line));
        }
    }
}
