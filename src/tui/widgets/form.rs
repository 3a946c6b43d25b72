//! Scrollable form widget: labelled field rows grouped into sections, with
//! inline errors under the offending field.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

/// Width of the label column, in cells.
const LABEL_WIDTH: usize = 30;

/// How a field's value is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text with a cursor when focused.
    Input,
    /// One of a fixed set of options, changed with ←/→.
    Choice,
    /// Read-only text, changed through dedicated keys.
    Display,
    /// A push button; the label is the whole row.
    Button,
}

/// A single row within a [`Form`].
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    /// Display label shown to the left of the value.
    pub label: String,
    /// Current value, already formatted for display.
    pub value: String,
    /// Shown dimmed while the value is empty.
    pub placeholder: &'static str,
    /// Validation error message, if any.
    pub error: Option<String>,
    /// Whether the label carries a required marker.
    pub required: bool,
    pub kind: FieldKind,
}

impl FormField {
    /// Creates a text input field.
    pub fn input(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            placeholder: "",
            error: None,
            required: false,
            kind: FieldKind::Input,
        }
    }

    /// Creates a choice field showing `value` as the current selection.
    pub fn choice(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Choice,
            ..Self::input(label, value)
        }
    }

    /// Creates a read-only field.
    pub fn display(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Display,
            ..Self::input(label, value)
        }
    }

    /// Creates a button.
    pub fn button(label: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Button,
            ..Self::input(label, "")
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FormRow {
    Section(String),
    Note(String),
    Field(FormField),
}

/// An ordered list of sections, notes and fields with at most one focused field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Form {
    rows: Vec<FormRow>,
    focus: Option<usize>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new titled section.
    pub fn push_section(&mut self, title: impl Into<String>) {
        self.rows.push(FormRow::Section(title.into()));
    }

    /// Adds a dimmed line of helper text.
    pub fn push_note(&mut self, text: impl Into<String>) {
        self.rows.push(FormRow::Note(text.into()));
    }

    /// Adds a field; `focused` moves the focus to it.
    pub fn push_field(&mut self, field: FormField, focused: bool) {
        if focused {
            self.focus = Some(self.rows.len());
        }
        self.rows.push(FormRow::Field(field));
    }

    /// Returns the fields in order, skipping sections and notes.
    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.rows.iter().filter_map(|row| match row {
            FormRow::Field(field) => Some(field),
            _ => None,
        })
    }

    /// Returns the focused field, if any.
    pub fn focused(&self) -> Option<&FormField> {
        match self.rows.get(self.focus?)? {
            FormRow::Field(field) => Some(field),
            _ => None,
        }
    }

    /// Lays the form out as lines, returning them with the index of the
    /// focused field's line.
    pub fn lines(&self) -> (Vec<Line<'_>>, Option<usize>) {
        let mut lines = Vec::new();
        let mut focus_line = None;

        for (i, row) in self.rows.iter().enumerate() {
            match row {
                FormRow::Section(title) => {
                    if !lines.is_empty() {
                        lines.push(Line::from(""));
                    }
                    lines.push(Line::from(Span::styled(
                        title.as_str(),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )));
                }
                FormRow::Note(text) => {
                    lines.push(Line::from(Span::styled(
                        format!("  {text}"),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
                FormRow::Field(field) => {
                    let focused = self.focus == Some(i);
                    if focused {
                        focus_line = Some(lines.len());
                    }
                    lines.push(field_line(field, focused));
                    if let Some(err) = &field.error {
                        lines.push(Line::from(Span::styled(
                            format!("  {:LABEL_WIDTH$}{err}", ""),
                            Style::default().fg(Color::Red),
                        )));
                    }
                }
            }
        }
        (lines, focus_line)
    }
}

fn field_line(field: &FormField, focused: bool) -> Line<'_> {
    let marker = if focused { "▶ " } else { "  " };
    let label_style = if field.error.is_some() {
        Style::default().fg(Color::Red)
    } else if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    if field.kind == FieldKind::Button {
        let style = if focused {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default().fg(Color::Cyan)
        };
        return Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("[ {} ]", field.label), style),
        ]);
    }

    let label = if field.required {
        format!("{} *", field.label)
    } else {
        field.label.clone()
    };
    let mut spans = vec![
        Span::raw(marker),
        Span::styled(format!("{label:LABEL_WIDTH$}"), label_style),
    ];

    match field.kind {
        FieldKind::Choice => {
            let arrow = Style::default().fg(if focused { Color::Yellow } else { Color::DarkGray });
            spans.push(Span::styled("‹ ", arrow));
            spans.push(Span::raw(field.value.as_str()));
            spans.push(Span::styled(" ›", arrow));
        }
        _ => {
            if field.value.is_empty() && !focused {
                spans.push(Span::styled(
                    field.placeholder,
                    Style::default().fg(Color::DarkGray),
                ));
            } else {
                spans.push(Span::raw(field.value.as_str()));
            }
            if focused && field.kind == FieldKind::Input {
                spans.push(Span::styled(
                    "\u{2588}",
                    Style::default().add_modifier(Modifier::SLOW_BLINK),
                ));
            }
        }
    }
    Line::from(spans)
}

/// Returns the first visible line so that `focus` stays on screen, keeping
/// one line of context below it when possible.
pub fn scroll_offset(focus: Option<usize>, height: usize, total: usize) -> usize {
    let Some(focus) = focus else {
        return 0;
    };
    if height == 0 || total <= height {
        return 0;
    }
    let wanted_bottom = (focus + 2).min(total);
    wanted_bottom.saturating_sub(height)
}

/// Renders a form within the given area, scrolled to its focused field.
#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
pub fn draw_form(form: &Form, frame: &mut Frame, area: Rect) {
    let (lines, focus_line) = form.lines();
    let offset = scroll_offset(focus_line, usize::from(area.height), lines.len());
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    frame.render_widget(Paragraph::new(lines).scroll((offset, 0)), area);
}
