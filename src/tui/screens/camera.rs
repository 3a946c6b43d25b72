//! Camera screen: live stream status with capture and close keys.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::camera::CameraStream;
use crate::tui::action::{Action, ScreenState};

/// State for the camera screen. The stream itself is owned by the app.
#[derive(Debug, Clone, Default)]
pub struct CameraState;

impl ScreenState for CameraState {
    fn handle_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('c') => Action::CapturePhoto,
            KeyCode::Esc | KeyCode::Char('q') => Action::CloseCamera,
            _ => Action::None,
        }
    }
}

/// One-line description of the stream's progress.
pub fn stream_status(stream: Option<&CameraStream>) -> String {
    match stream {
        None => "Camera closed".to_string(),
        Some(stream) => match stream.latest_len() {
            None => "Starting camera...".to_string(),
            Some(len) => format!(
                "● LIVE  frame {}  ({:.1} KB)",
                stream.frames_received(),
                len as f64 / 1024.0
            ),
        },
    }
}

/// Renders the camera screen.
#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
pub fn draw_camera(stream: Option<&CameraStream>, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Visitor Photo ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [_, body_area, footer_area] = Layout::vertical([
        Constraint::Percentage(35),
        Constraint::Min(4),
        Constraint::Length(1),
    ])
    .areas(inner);

    let live = stream.is_some_and(CameraStream::is_live);
    let status_style = if live {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let lines = vec![
        Line::from(Span::styled(stream_status(stream), status_style)),
        Line::from(""),
        Line::from("Ask the visitor to face the camera."),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        body_area,
    );

    let footer = Paragraph::new("Enter: capture photo  Esc: close camera")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, footer_area);
}
