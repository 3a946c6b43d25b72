//! Status bar widget: environment indicator, submission progress and key hints.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::config::Environment;

/// Data passed to the status bar widget.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusBarContext {
    pub environment: Environment,
    /// A registration is on its way to the intake endpoint.
    pub submitting: bool,
    /// Key hints for the current screen.
    pub hint: &'static str,
}

/// Renders a one-line status bar.
///
/// Display format:
/// - Development/stage: `[Development Mode] <hint>` (mode in Yellow/Magenta)
/// - Production:        `<hint>`
/// - While submitting the hint is replaced by `Submitting...`.
#[mutants::skip]
pub fn draw_status_bar(ctx: &StatusBarContext, frame: &mut Frame, area: Rect) {
    let mut spans: Vec<Span> = Vec::new();

    if let Some(label) = ctx.environment.mode_label() {
        let color = match ctx.environment {
            Environment::Development => Color::Yellow,
            _ => Color::Magenta,
        };
        spans.push(Span::styled(
            format!("[{label}]"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw("  "));
    }

    if ctx.submitting {
        spans.push(Span::styled(
            "Submitting...",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::styled(ctx.hint, Style::default().fg(Color::DarkGray)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
