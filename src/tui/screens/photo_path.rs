//! Photo file prompt, used when the camera cannot stream.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::action::{Action, ScreenState};
use crate::tui::app::Screen;
use crate::tui::widgets::form::{Form, FormField, draw_form};

/// State for the photo file prompt.
#[derive(Debug, Clone, Default)]
pub struct PhotoPathState {
    path: String,
    error: Option<String>,
}

impl PhotoPathState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the typed path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the current error message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Sets an error message to display.
    pub fn set_error(&mut self, msg: String) {
        self.error = Some(msg);
    }

    /// Clears the path and error.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn submit(&mut self) -> Action {
        let path = self.path.trim();
        if path.is_empty() {
            self.error = Some("Enter the path of a photo file.".into());
            return Action::None;
        }
        Action::LoadPhoto(expand_home(path))
    }
}

impl ScreenState for PhotoPathState {
    fn handle_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char(ch) => {
                self.path.push(ch);
                self.error = None;
                Action::None
            }
            KeyCode::Backspace => {
                self.path.pop();
                self.error = None;
                Action::None
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Esc => Action::Navigate(Screen::Registration),
            _ => Action::None,
        }
    }
}

/// Expands a leading `~/` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Renders the photo file prompt.
#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
pub fn draw_photo_path(state: &PhotoPathState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Choose Photo File ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [form_area, footer_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);

    let mut form = Form::new();
    form.push_note("Camera streaming is unavailable. Enter the path of an image file.");
    form.push_field(
        FormField::input("Photo file", state.path())
            .placeholder("~/Pictures/visitor.jpg")
            .error(state.error().map(str::to_string)),
        true,
    );
    draw_form(&form, frame, form_area);

    let footer =
        Paragraph::new("Enter: use photo  Esc: cancel").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, footer_area);
}
