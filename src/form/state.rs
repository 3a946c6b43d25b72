use std::collections::BTreeSet;

use chrono::NaiveDateTime;

use super::event::{FailureKind, FormEvent, MembersKind, TextField};
use crate::model::{
    FieldKey, FormValues, GroupCounts, Members, ValidationError, ValidationErrors, VehicleEntry,
    format_datetime_input, format_vehicle_number, normalize_phone, title_case_input, validate,
};
use crate::submission::SubmissionRecord;

/// Where the form is in the submission lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStatus {
    /// Editable, nothing submitted yet.
    Idle,
    /// The last submit attempt failed validation.
    Invalid,
    /// The record is on its way to the intake endpoint.
    Submitting(Box<SubmissionRecord>),
    Succeeded,
    /// The intake endpoint refused the record or could not be reached.
    Failed(FailureKind),
}

/// Severity of a [`Dialog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Success,
    Error,
}

/// A blocking message shown over the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub title: &'static str,
    pub message: &'static str,
}

impl Dialog {
    const INVALID: Dialog = Dialog {
        kind: DialogKind::Error,
        title: "Validation Error",
        message: "Please fix the highlighted fields and try again.",
    };
    const SUCCESS: Dialog = Dialog {
        kind: DialogKind::Success,
        title: "Success!",
        message: "Walk-In Registration successfully submitted.",
    };
    const REJECTED: Dialog = Dialog {
        kind: DialogKind::Error,
        title: "Submission Error",
        message: "There was an error submitting the form. Please try again later.",
    };
    const UNEXPECTED: Dialog = Dialog {
        kind: DialogKind::Error,
        title: "Error",
        message: "An unexpected error occurred. Please try again later.",
    };

    fn for_failure(kind: FailureKind) -> Self {
        match kind {
            FailureKind::Rejected => Self::REJECTED,
            FailureKind::Unexpected => Self::UNEXPECTED,
        }
    }
}

/// Touched flags for one vehicle row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct VehicleTouched {
    number: bool,
    kind: bool,
}

/// Complete state of the registration form.
///
/// Only [`reduce`] changes it. Errors are recomputed when a field is blurred,
/// when a touched field changes, when a vehicle row is removed and on submit;
/// they are shown only for touched fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    values: FormValues,
    errors: ValidationErrors,
    touched: BTreeSet<FieldKey>,
    touched_vehicles: Vec<VehicleTouched>,
    status: SubmitStatus,
    dialog: Option<Dialog>,
}

impl FormState {
    /// Creates a fresh form opened at `now`.
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            values: FormValues::new(now),
            errors: ValidationErrors::default(),
            touched: BTreeSet::new(),
            touched_vehicles: Vec::new(),
            status: SubmitStatus::Idle,
            dialog: None,
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn status(&self) -> &SubmitStatus {
        &self.status
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.status, SubmitStatus::Submitting(_))
    }

    /// The record awaiting transport, while submitting.
    pub fn pending_submission(&self) -> Option<&SubmissionRecord> {
        match &self.status {
            SubmitStatus::Submitting(record) => Some(record),
            _ => None,
        }
    }

    /// Returns `true` once the user has left `key` at least once.
    pub fn is_touched(&self, key: FieldKey) -> bool {
        match key {
            FieldKey::VehicleNumber(i) => self.touched_vehicles.get(i).is_some_and(|t| t.number),
            FieldKey::VehicleType(i) => self.touched_vehicles.get(i).is_some_and(|t| t.kind),
            other => self.touched.contains(&other),
        }
    }

    /// The error to display for `key`, if the field is touched and invalid.
    ///
    /// The group-total error has no field of its own and is shown whenever it
    /// is present while the group mode is active.
    pub fn visible_error(&self, key: FieldKey) -> Option<&ValidationError> {
        match key {
            FieldKey::GroupTotal if self.values.members.is_group() => self.errors.get(key),
            FieldKey::GroupTotal => None,
            _ if self.is_touched(key) => self.errors.get(key),
            _ => None,
        }
    }

    fn revalidate(&mut self) {
        self.errors = validate(&self.values);
    }

    fn revalidate_if_touched(&mut self, key: FieldKey) {
        if self.is_touched(key) {
            self.revalidate();
        }
    }

    fn touch(&mut self, key: FieldKey) {
        match key {
            FieldKey::VehicleNumber(i) => {
                if let Some(t) = self.touched_vehicles.get_mut(i) {
                    t.number = true;
                }
            }
            FieldKey::VehicleType(i) => {
                if let Some(t) = self.touched_vehicles.get_mut(i) {
                    t.kind = true;
                }
            }
            other => {
                self.touched.insert(other);
            }
        }
    }

    fn touch_all(&mut self) {
        self.touched.extend([
            FieldKey::FullName,
            FieldKey::Phone,
            FieldKey::Email,
            FieldKey::Gender,
            FieldKey::Departure,
            FieldKey::Members,
            FieldKey::Men,
            FieldKey::Women,
            FieldKey::Boys,
            FieldKey::Girls,
        ]);
        self.touched_vehicles = vec![
            VehicleTouched {
                number: true,
                kind: true,
            };
            self.values.vehicles.len()
        ];
    }

    fn set_text(&mut self, field: TextField, raw: &str) {
        let values = &mut self.values;
        match field {
            TextField::FullName => values.full_name = title_case_input(raw),
            TextField::Phone => values.phone = normalize_phone(raw),
            TextField::Email => values.email = raw.to_string(),
            TextField::Departure => values.departure = format_datetime_input(raw),
            TextField::Men | TextField::Women | TextField::Boys | TextField::Girls => {
                let Members::Group(counts) = &mut values.members else {
                    return;
                };
                let slot = match field {
                    TextField::Men => &mut counts.men,
                    TextField::Women => &mut counts.women,
                    TextField::Boys => &mut counts.boys,
                    _ => &mut counts.girls,
                };
                *slot = raw.trim().to_string();
            }
        }
    }

    fn reset(&mut self, now: NaiveDateTime) {
        *self = Self::new(now);
    }
}

/// Applies one event to the form state.
pub fn reduce(mut state: FormState, event: FormEvent) -> FormState {
    match event {
        FormEvent::TextChanged(field, raw) => {
            if field.is_count() && !state.values.members.is_group() {
                return state;
            }
            state.set_text(field, &raw);
            state.revalidate_if_touched(field.key());
        }
        FormEvent::GenderSelected(gender) => {
            state.values.gender = Some(gender);
            state.revalidate_if_touched(FieldKey::Gender);
        }
        FormEvent::MembersSelected(kind) => {
            state.values.members = match kind {
                MembersKind::Single => Members::Single,
                MembersKind::Group => Members::Group(GroupCounts::zeroed()),
            };
            state.revalidate_if_touched(FieldKey::Members);
        }
        FormEvent::Blurred(key) => {
            state.touch(key);
            state.revalidate();
        }
        FormEvent::VehicleAdded => {
            state.values.vehicles.push(VehicleEntry::default());
            state.touched_vehicles.push(VehicleTouched::default());
        }
        FormEvent::VehicleRemoved(index) => {
            if index < state.values.vehicles.len() {
                state.values.vehicles.remove(index);
                if index < state.touched_vehicles.len() {
                    state.touched_vehicles.remove(index);
                }
                state.revalidate();
            }
        }
        FormEvent::VehicleNumberChanged(index, raw) => {
            if let Some(vehicle) = state.values.vehicles.get_mut(index) {
                vehicle.number = format_vehicle_number(&raw);
                state.revalidate_if_touched(FieldKey::VehicleNumber(index));
            }
        }
        FormEvent::VehicleTypeSelected(index, kind) => {
            if let Some(vehicle) = state.values.vehicles.get_mut(index) {
                vehicle.kind = kind;
                state.revalidate_if_touched(FieldKey::VehicleType(index));
            }
        }
        FormEvent::PhotoSelected(photo) => state.values.photo = Some(photo),
        FormEvent::PhotoCleared => state.values.photo = None,
        FormEvent::SubmitRequested { now } => {
            if state.is_submitting() {
                return state;
            }
            state.values.arrival = now;
            state.revalidate();
            state.touch_all();
            if state.errors.is_empty() {
                let record = SubmissionRecord::from_values(&state.values, now);
                state.status = SubmitStatus::Submitting(Box::new(record));
            } else {
                state.status = SubmitStatus::Invalid;
                state.dialog = Some(Dialog::INVALID);
            }
        }
        FormEvent::SubmitSucceeded => {
            if state.is_submitting() {
                state.status = SubmitStatus::Succeeded;
                state.dialog = Some(Dialog::SUCCESS);
            }
        }
        FormEvent::SubmitFailed(kind) => {
            if state.is_submitting() {
                state.status = SubmitStatus::Failed(kind);
                state.dialog = Some(Dialog::for_failure(kind));
            }
        }
        FormEvent::DialogDismissed { now } => {
            if state.status == SubmitStatus::Succeeded {
                state.reset(now);
            } else {
                state.dialog = None;
            }
        }
        FormEvent::ResetRequested { now } => {
            if !state.is_submitting() {
                state.reset(now);
            }
        }
    }
    state
}
