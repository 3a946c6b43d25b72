//! Key and input-format reference, opened with F1 from any screen.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::model::VehicleType;
use crate::tui::action::{Action, ScreenState};
use crate::tui::app::Screen;

/// Lines moved by PageUp / PageDown.
const PAGE: u16 = 10;

/// A titled group of key bindings.
struct KeyGroup {
    title: &'static str,
    bindings: &'static [(&'static str, &'static str)],
}

static FORM_KEYS: KeyGroup = KeyGroup {
    title: "Registration form",
    bindings: &[
        ("Tab / ↓", "next field"),
        ("Shift-Tab / ↑", "previous field"),
        ("← / → / Space", "change selection"),
        ("Enter", "submit; on a button: press it"),
        ("Enter (photo)", "open camera"),
        ("Ctrl+O", "choose photo file"),
        ("Del (photo)", "remove photo"),
        ("Ctrl+N", "add vehicle"),
        ("Ctrl+D", "remove focused vehicle"),
        ("Ctrl+S", "submit registration"),
        ("Ctrl+R", "reset form"),
        ("Enter / Esc", "close dialog"),
    ],
};

static CAMERA_KEYS: KeyGroup = KeyGroup {
    title: "Camera",
    bindings: &[("Enter / Space / c", "capture photo"), ("Esc / q", "close camera")],
};

static PHOTO_FILE_KEYS: KeyGroup = KeyGroup {
    title: "Photo file",
    bindings: &[("Enter", "use photo file"), ("Esc", "back to the form")],
};

static GLOBAL_KEYS: KeyGroup = KeyGroup {
    title: "Anywhere",
    bindings: &[
        ("F1", "this help"),
        ("↑ / ↓, PgUp / PgDn", "scroll help"),
        ("Home", "top of help"),
        ("q / Esc", "leave help"),
        ("Ctrl+C", "quit"),
    ],
};

/// How typed input is shaped before it is validated.
static INPUT_FORMATS: &[(&str, &str)] = &[
    ("Full name", "capitalized as you type, at least 2 characters"),
    ("Phone", "digits only, with country code, 6 to 15 digits"),
    ("Email", "optional"),
    ("Departure", "type digits: 202401051800 becomes 2024-01-05T18:00"),
    ("Members", "Single counts the visitor by gender; Group needs a total above 0"),
    ("Vehicle number", "letters and digits are grouped as KA 01 AB 1234"),
];

/// State for the help screen.
#[derive(Debug, Clone)]
pub struct HelpState {
    offset: u16,
    origin: Screen,
}

impl Default for HelpState {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpState {
    pub fn new() -> Self {
        Self {
            offset: 0,
            origin: Screen::Registration,
        }
    }

    /// Lines scrolled past the top.
    pub fn scroll(&self) -> u16 {
        self.offset
    }

    /// Returns the screen help goes back to.
    pub fn origin(&self) -> Screen {
        self.origin
    }

    /// Opens help on top of `screen`, showing its keys first.
    pub fn open_from(&mut self, screen: Screen) {
        *self = Self {
            offset: 0,
            origin: screen,
        };
    }
}

impl ScreenState for HelpState {
    fn handle_key(&mut self, key: KeyEvent) -> Action {
        self.offset = match key.code {
            KeyCode::Up => self.offset.saturating_sub(1),
            KeyCode::Down => self.offset.saturating_add(1),
            KeyCode::PageUp => self.offset.saturating_sub(PAGE),
            KeyCode::PageDown => self.offset.saturating_add(PAGE),
            KeyCode::Home => 0,
            KeyCode::Char('q') | KeyCode::Esc => return Action::Navigate(self.origin),
            _ => return Action::None,
        };
        Action::None
    }
}

/// Key groups in display order: the origin screen's own keys lead.
fn key_groups(origin: Screen) -> Vec<&'static KeyGroup> {
    let own: &'static KeyGroup = match origin {
        Screen::Camera => &CAMERA_KEYS,
        Screen::PhotoPath => &PHOTO_FILE_KEYS,
        Screen::Registration | Screen::Help => &FORM_KEYS,
    };
    let mut groups = vec![own];
    groups.extend(
        [&FORM_KEYS, &CAMERA_KEYS, &PHOTO_FILE_KEYS]
            .into_iter()
            .filter(|group| group.title != own.title),
    );
    groups.push(&GLOBAL_KEYS);
    groups
}

fn heading(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
}

fn entry(name: &'static str, text: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {name:<20}"), Style::default().fg(Color::Yellow)),
        Span::raw(text),
    ])
}

fn help_lines(origin: Screen) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for group in key_groups(origin) {
        lines.push(heading(group.title));
        lines.extend(group.bindings.iter().map(|(key, text)| entry(key, text)));
        lines.push(Line::default());
    }

    lines.push(heading("Input formats"));
    lines.extend(INPUT_FORMATS.iter().map(|(field, text)| entry(field, text)));
    let types: Vec<&str> = VehicleType::all().iter().map(VehicleType::menu_label).collect();
    lines.push(Line::default());
    lines.push(heading("Vehicle types"));
    lines.push(Line::styled(
        format!("  {}", types.join(", ")),
        Style::default().fg(Color::DarkGray),
    ));
    lines
}

/// Renders the help screen.
#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
pub fn draw_help(state: &HelpState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [body, footer] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);

    let lines = help_lines(state.origin());
    let last = (lines.len() as u16).saturating_sub(body.height);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((state.scroll().min(last), 0)),
        body,
    );
    frame.render_widget(
        Paragraph::new("↑/↓ PgUp/PgDn: scroll  q/Esc: back")
            .style(Style::default().fg(Color::DarkGray)),
        footer,
    );
}
