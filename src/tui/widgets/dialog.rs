//! Modal dialog drawn over the current screen.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::form::{Dialog, DialogKind};

/// Label of the dialog's only button.
pub fn button_label(dialog: &Dialog) -> &'static str {
    match dialog.kind {
        DialogKind::Success => "Done",
        DialogKind::Error => "OK",
    }
}

/// Returns a centered rectangle of at most `width` x `height` within `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}

/// Renders `dialog` centered in `area`, clearing what is underneath.
#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
pub fn draw_dialog(dialog: &Dialog, frame: &mut Frame, area: Rect) {
    let color = match dialog.kind {
        DialogKind::Success => Color::Green,
        DialogKind::Error => Color::Red,
    };
    let popup = centered(area, 56, 8);

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", dialog.title),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let lines = vec![
        Line::from(""),
        Line::from(dialog.message),
        Line::from(""),
        Line::from(Span::styled(
            format!("[ {} ]", button_label(dialog)),
            Style::default().fg(Color::Black).bg(color),
        )),
    ];

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block),
        popup,
    );
}
