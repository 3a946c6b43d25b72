//! Registration screen: the walk-in visitor form.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::camera::PhotoPreview;
use crate::form::{FormEvent, FormState, MembersKind, TextField};
use crate::model::{FieldKey, FormValues, Gender, Members, VehicleType};
use crate::tui::action::Action;
use crate::tui::widgets::form::{Form, FormField, draw_form};

/// A focusable element of the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Text(TextField),
    Photo,
    Gender,
    Members,
    VehicleNumber(usize),
    VehicleType(usize),
    AddVehicle,
    Submit,
    Reset,
}

impl Control {
    /// The validation key of the field this control edits.
    fn field_key(self) -> Option<FieldKey> {
        match self {
            Control::Text(field) => Some(field.key()),
            Control::Gender => Some(FieldKey::Gender),
            Control::Members => Some(FieldKey::Members),
            Control::VehicleNumber(i) => Some(FieldKey::VehicleNumber(i)),
            Control::VehicleType(i) => Some(FieldKey::VehicleType(i)),
            Control::Photo | Control::AddVehicle | Control::Submit | Control::Reset => None,
        }
    }
}

/// Lists the controls for the current values, in focus order.
///
/// Head-count inputs exist only in group mode; each vehicle row adds a number
/// and a type control.
pub fn controls(values: &FormValues) -> Vec<Control> {
    let mut controls = vec![
        Control::Text(TextField::FullName),
        Control::Text(TextField::Phone),
        Control::Text(TextField::Email),
        Control::Photo,
        Control::Gender,
        Control::Text(TextField::Departure),
        Control::Members,
    ];
    if values.members.is_group() {
        controls.extend(
            [
                TextField::Men,
                TextField::Women,
                TextField::Boys,
                TextField::Girls,
            ]
            .map(Control::Text),
        );
    }
    for i in 0..values.vehicles.len() {
        controls.push(Control::VehicleNumber(i));
        controls.push(Control::VehicleType(i));
    }
    controls.extend([Control::AddVehicle, Control::Submit, Control::Reset]);
    controls
}

/// The stored text behind a text field.
fn text_value(values: &FormValues, field: TextField) -> &str {
    match (field, &values.members) {
        (TextField::FullName, _) => &values.full_name,
        (TextField::Phone, _) => &values.phone,
        (TextField::Email, _) => &values.email,
        (TextField::Departure, _) => &values.departure,
        (TextField::Men, Members::Group(counts)) => &counts.men,
        (TextField::Women, Members::Group(counts)) => &counts.women,
        (TextField::Boys, Members::Group(counts)) => &counts.boys,
        (TextField::Girls, Members::Group(counts)) => &counts.girls,
        _ => "",
    }
}

/// Fields that only take digits.
fn digits_only(field: TextField) -> bool {
    field.is_count() || matches!(field, TextField::Phone | TextField::Departure)
}

/// Steps through the vehicle type menu, including the unselected entry.
fn cycle_vehicle_type(current: Option<VehicleType>, forward: bool) -> Option<VehicleType> {
    let options: Vec<Option<VehicleType>> = std::iter::once(None)
        .chain(VehicleType::all().iter().copied().map(Some))
        .collect();
    let pos = options.iter().position(|&o| o == current).unwrap_or(0);
    let next = if forward {
        (pos + 1) % options.len()
    } else {
        (pos + options.len() - 1) % options.len()
    };
    options[next]
}

/// State for the registration screen.
///
/// The form values live in [`FormState`]; this only tracks focus.
#[derive(Debug, Clone, Default)]
pub struct RegistrationState {
    focus: usize,
}

impl RegistrationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of the focused control.
    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Returns the focused control, clamped to the controls that exist.
    pub fn focused(&self, values: &FormValues) -> Control {
        let controls = controls(values);
        controls[self.focus.min(controls.len() - 1)]
    }

    /// Moves focus back to the first field.
    pub fn reset(&mut self) {
        self.focus = 0;
    }

    /// Handles a key event against the current form, returning an [`Action`]
    /// for the app to apply.
    pub fn handle_key(&mut self, key: KeyEvent, form: &FormState) -> Action {
        if form.dialog().is_some() {
            return match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Action::DismissDialog,
                _ => Action::None,
            };
        }
        if form.is_submitting() {
            return Action::None;
        }

        let values = form.values();
        let controls = controls(values);
        self.focus = self.focus.min(controls.len() - 1);
        let control = controls[self.focus];

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('s') => Action::Submit,
                KeyCode::Char('n') => Action::Form(FormEvent::VehicleAdded),
                KeyCode::Char('d') => match control {
                    Control::VehicleNumber(i) | Control::VehicleType(i) => {
                        Action::Form(FormEvent::VehicleRemoved(i))
                    }
                    _ => Action::None,
                },
                KeyCode::Char('o') => Action::PickPhoto,
                KeyCode::Char('r') => Action::Reset,
                KeyCode::Char('c') | KeyCode::Char('q') => Action::Quit,
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => self.move_focus(control, controls.len(), true),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(control, controls.len(), false),
            KeyCode::Enter => press_control(control),
            KeyCode::Left => choose(control, values, false),
            KeyCode::Right => choose(control, values, true),
            KeyCode::Char(' ') if !matches!(control, Control::Text(_) | Control::VehicleNumber(_)) => {
                match control {
                    Control::Gender | Control::Members | Control::VehicleType(_) => {
                        choose(control, values, true)
                    }
                    other => press_control(other),
                }
            }
            KeyCode::Char(ch) => type_char(control, values, ch),
            KeyCode::Backspace => delete_char(control, values),
            KeyCode::Delete if control == Control::Photo => Action::ClearPhoto,
            _ => Action::None,
        }
    }

    /// Moves focus, reporting the blur of the control being left.
    fn move_focus(&mut self, leaving: Control, count: usize, forward: bool) -> Action {
        self.focus = if forward {
            (self.focus + 1) % count
        } else {
            (self.focus + count - 1) % count
        };
        match leaving.field_key() {
            Some(key) => Action::Form(FormEvent::Blurred(key)),
            None => Action::None,
        }
    }
}

fn press_control(control: Control) -> Action {
    match control {
        Control::AddVehicle => Action::Form(FormEvent::VehicleAdded),
        Control::Reset => Action::Reset,
        Control::Photo => Action::OpenCamera,
        _ => Action::Submit,
    }
}

fn choose(control: Control, values: &FormValues, forward: bool) -> Action {
    match control {
        Control::Gender => {
            let next = match (values.gender, forward) {
                (Some(Gender::Male), _) => Gender::Female,
                (Some(Gender::Female), _) => Gender::Male,
                (None, true) => Gender::Male,
                (None, false) => Gender::Female,
            };
            Action::Form(FormEvent::GenderSelected(next))
        }
        Control::Members => {
            let next = if values.members.is_group() {
                MembersKind::Single
            } else {
                MembersKind::Group
            };
            Action::Form(FormEvent::MembersSelected(next))
        }
        Control::VehicleType(i) => {
            let current = values.vehicles.get(i).and_then(|v| v.kind);
            Action::Form(FormEvent::VehicleTypeSelected(
                i,
                cycle_vehicle_type(current, forward),
            ))
        }
        _ => Action::None,
    }
}

fn type_char(control: Control, values: &FormValues, ch: char) -> Action {
    match control {
        Control::Text(field) => {
            if digits_only(field) && !ch.is_ascii_digit() {
                return Action::None;
            }
            let mut value = text_value(values, field).to_string();
            value.push(ch);
            Action::Form(FormEvent::TextChanged(field, value))
        }
        Control::VehicleNumber(i) => {
            let Some(vehicle) = values.vehicles.get(i) else {
                return Action::None;
            };
            let mut value = vehicle.number.clone();
            value.push(ch);
            Action::Form(FormEvent::VehicleNumberChanged(i, value))
        }
        _ => Action::None,
    }
}

fn delete_char(control: Control, values: &FormValues) -> Action {
    match control {
        Control::Text(field) => {
            let mut value = text_value(values, field).to_string();
            if value.pop().is_none() {
                return Action::None;
            }
            Action::Form(FormEvent::TextChanged(field, value))
        }
        Control::VehicleNumber(i) => {
            let Some(vehicle) = values.vehicles.get(i) else {
                return Action::None;
            };
            let mut value = vehicle.number.clone();
            if value.pop().is_none() {
                return Action::None;
            }
            Action::Form(FormEvent::VehicleNumberChanged(i, value))
        }
        _ => Action::None,
    }
}

/// Builds the form rows for the current state.
pub fn build_form(
    state: &RegistrationState,
    form: &FormState,
    camera_error: Option<&str>,
    preview: Option<&PhotoPreview>,
) -> Form {
    let values = form.values();
    let focused = state.focused(values);
    let error = |key: FieldKey| form.visible_error(key).map(ToString::to_string);
    let text = |field: TextField| text_value(values, field).to_string();

    let mut rows = Form::new();

    rows.push_section("Visitor Details");
    rows.push_field(
        FormField::input("Full Name", text(TextField::FullName))
            .required()
            .placeholder("Enter full name")
            .error(error(FieldKey::FullName)),
        focused == Control::Text(TextField::FullName),
    );
    let phone = if values.phone.is_empty() {
        String::new()
    } else {
        format!("+{}", values.phone)
    };
    rows.push_field(
        FormField::input("Phone Number", phone)
            .required()
            .placeholder("+91 98765 43210")
            .error(error(FieldKey::Phone)),
        focused == Control::Text(TextField::Phone),
    );
    rows.push_field(
        FormField::input("Email", text(TextField::Email))
            .placeholder("name@example.com")
            .error(error(FieldKey::Email)),
        focused == Control::Text(TextField::Email),
    );

    let photo = match (&values.photo, preview) {
        (Some(photo), Some(preview)) => {
            format!("{} ({})", photo.file_name, preview.path().display())
        }
        (Some(photo), None) => photo.file_name.clone(),
        (None, _) => String::new(),
    };
    rows.push_field(
        FormField::display("Visitor Photo", photo)
            .placeholder("No photo")
            .error(camera_error.map(str::to_string)),
        focused == Control::Photo,
    );
    rows.push_note("Upload a clear headshot (optional).");
    if focused == Control::Photo {
        rows.push_note("Enter: open camera  Ctrl+O: choose file  Del: remove photo");
    }

    let gender = values.gender.map_or("Select".to_string(), |g| g.to_string());
    rows.push_field(
        FormField::choice("Gender", gender)
            .required()
            .error(error(FieldKey::Gender)),
        focused == Control::Gender,
    );

    rows.push_section("Visit Schedule");
    rows.push_field(
        FormField::input("Expected Departure Date-Time", values.departure.replace('T', " "))
            .required()
            .placeholder("YYYY-MM-DD HH:MM")
            .error(error(FieldKey::Departure)),
        focused == Control::Text(TextField::Departure),
    );

    rows.push_section("Members");
    let members_error = [FieldKey::Members, FieldKey::GroupTotal]
        .into_iter()
        .filter_map(&error)
        .collect::<Vec<_>>();
    let members = if values.members.is_group() {
        "Group"
    } else {
        "Single"
    };
    rows.push_field(
        FormField::choice("Members", members)
            .required()
            .error((!members_error.is_empty()).then(|| members_error.join(" "))),
        focused == Control::Members,
    );
    if values.members.is_group() {
        for (field, label) in [
            (TextField::Men, "Number of Men"),
            (TextField::Women, "Number of Women"),
            (TextField::Boys, "Number of Boys"),
            (TextField::Girls, "Number of Girls"),
        ] {
            rows.push_field(
                FormField::input(label, text(field))
                    .placeholder("0")
                    .error(error(field.key())),
                focused == Control::Text(field),
            );
        }
    }

    rows.push_section("Vehicle Details");
    for (i, vehicle) in values.vehicles.iter().enumerate() {
        rows.push_note(format!("Vehicle {}  (Ctrl+D: remove)", i + 1));
        rows.push_field(
            FormField::input("Vehicle Number", vehicle.number.clone())
                .required()
                .placeholder("KA 01 AB 1234")
                .error(error(FieldKey::VehicleNumber(i))),
            focused == Control::VehicleNumber(i),
        );
        rows.push_field(
            FormField::choice(
                "Vehicle Type",
                vehicle.kind.map_or("Select", |k| k.menu_label()),
            )
            .required()
            .error(error(FieldKey::VehicleType(i))),
            focused == Control::VehicleType(i),
        );
    }
    rows.push_field(
        FormField::button("Add Vehicle"),
        focused == Control::AddVehicle,
    );

    rows.push_note("");
    let submit = if form.is_submitting() {
        "Submitting..."
    } else {
        "Submit Registration"
    };
    rows.push_field(FormField::button(submit), focused == Control::Submit);
    rows.push_field(FormField::button("Reset"), focused == Control::Reset);
    rows
}

/// Renders the registration screen.
#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
pub fn draw_registration(
    state: &RegistrationState,
    form: &FormState,
    camera_error: Option<&str>,
    preview: Option<&PhotoPreview>,
    frame: &mut Frame,
    area: Rect,
) {
    let block = Block::default()
        .title(" Visitor Entry Form ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [header_area, form_area] =
        Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(inner);

    let header = Line::from(Span::styled(
        "Walk-In Registration",
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(header), header_area);

    let rows = build_form(state, form, camera_error, preview);
    draw_form(&rows, frame, form_area);
}
