use chrono::NaiveDateTime;

use crate::model::{FieldKey, Gender, Photo, VehicleType};

/// Free-text fields of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    FullName,
    Phone,
    Email,
    Departure,
    Men,
    Women,
    Boys,
    Girls,
}

impl TextField {
    /// The validation key errors for this field are reported under.
    pub fn key(self) -> FieldKey {
        match self {
            TextField::FullName => FieldKey::FullName,
            TextField::Phone => FieldKey::Phone,
            TextField::Email => FieldKey::Email,
            TextField::Departure => FieldKey::Departure,
            TextField::Men => FieldKey::Men,
            TextField::Women => FieldKey::Women,
            TextField::Boys => FieldKey::Boys,
            TextField::Girls => FieldKey::Girls,
        }
    }

    /// Returns `true` for the four group head-count fields.
    pub fn is_count(self) -> bool {
        matches!(
            self,
            TextField::Men | TextField::Women | TextField::Boys | TextField::Girls
        )
    }
}

/// Which member mode the visitor picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembersKind {
    Single,
    Group,
}

/// How a submission attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The endpoint answered with a non-2xx status or an empty body.
    Rejected,
    /// The request never completed or the response could not be read.
    Unexpected,
}

/// A user interaction, or the result of one, applied by [`reduce`](super::reduce).
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    /// A text field received new raw input.
    TextChanged(TextField, String),
    GenderSelected(Gender),
    MembersSelected(MembersKind),
    /// Focus left a field; marks it touched. Vehicle keys address a row.
    Blurred(FieldKey),
    VehicleAdded,
    VehicleRemoved(usize),
    VehicleNumberChanged(usize, String),
    VehicleTypeSelected(usize, Option<VehicleType>),
    PhotoSelected(Photo),
    PhotoCleared,
    SubmitRequested { now: NaiveDateTime },
    SubmitSucceeded,
    SubmitFailed(FailureKind),
    DialogDismissed { now: NaiveDateTime },
    ResetRequested { now: NaiveDateTime },
}
