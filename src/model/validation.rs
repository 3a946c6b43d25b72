use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{NaiveDateTime, Timelike};
use regex::Regex;
use thiserror::Error;

use super::normalize::DATETIME_LOCAL_FORMAT;
use super::visitor::{FormValues, GroupCounts, Members, VehicleEntry};

/// Validation errors for registration form fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Full name is required.")]
    FullNameRequired,
    #[error("Full name must be at least 2 characters.")]
    FullNameTooShort,
    #[error("Phone number is required.")]
    PhoneRequired,
    #[error("Enter a valid phone number.")]
    InvalidPhone,
    #[error("Enter a valid email address.")]
    InvalidEmail,
    #[error("Select a gender.")]
    GenderRequired,
    #[error("Departure date-time is required.")]
    DepartureRequired,
    #[error("Enter departure as YYYY-MM-DD HH:MM.")]
    InvalidDeparture,
    #[error("Departure cannot be in the past.")]
    DepartureInPast,
    #[error("Required for group.")]
    CountRequired,
    #[error("Enter a valid number.")]
    InvalidCount,
    #[error("Provide at least one group member.")]
    EmptyGroup,
    #[error("Vehicle number is required.")]
    VehicleNumberRequired,
    #[error("Use format: KA 01 AB 1234")]
    InvalidVehicleNumber,
    #[error("Select a vehicle type.")]
    VehicleTypeRequired,
}

/// Identifies the form field an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    FullName,
    Phone,
    Email,
    Gender,
    Departure,
    Members,
    Men,
    Women,
    Boys,
    Girls,
    GroupTotal,
    VehicleNumber(usize),
    VehicleType(usize),
}

/// Field errors produced by [`validate`]. Valid fields have no entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(BTreeMap<FieldKey, ValidationError>);

impl ValidationErrors {
    pub fn get(&self, key: FieldKey) -> Option<&ValidationError> {
        self.0.get(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &ValidationError)> {
        self.0.iter()
    }

    fn insert(&mut self, key: FieldKey, error: ValidationError) {
        self.0.insert(key, error);
    }
}

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{6,15}$").expect("valid hardcoded regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid hardcoded regex"));

static PLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{2} [0-9]{1,2} [A-Z]{1,3} [0-9]{4}$").expect("valid hardcoded regex")
});

/// Validates a full name: required, at least 2 characters once trimmed.
pub fn validate_full_name(name: &str) -> Result<(), ValidationError> {
    match name.trim() {
        "" => Err(ValidationError::FullNameRequired),
        s if s.chars().count() < 2 => Err(ValidationError::FullNameTooShort),
        _ => Ok(()),
    }
}

/// Validates a phone number: 6 to 15 digits.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    match phone.trim() {
        "" => Err(ValidationError::PhoneRequired),
        s if PHONE_RE.is_match(s) => Ok(()),
        _ => Err(ValidationError::InvalidPhone),
    }
}

/// Validates an optional email address. Blank is accepted.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() || EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Validates a departure stamp against the earliest allowed time.
///
/// Comparison is at minute precision, the precision of the input.
pub fn validate_departure(departure: &str, earliest: NaiveDateTime) -> Result<(), ValidationError> {
    if departure.is_empty() {
        return Err(ValidationError::DepartureRequired);
    }
    let parsed = NaiveDateTime::parse_from_str(departure, DATETIME_LOCAL_FORMAT)
        .map_err(|_| ValidationError::InvalidDeparture)?;
    let minute = earliest
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(earliest);
    if parsed < minute {
        return Err(ValidationError::DepartureInPast);
    }
    Ok(())
}

/// Validates a registration plate such as `KA 01 AB 1234`.
pub fn validate_vehicle_number(number: &str) -> Result<(), ValidationError> {
    match number.trim() {
        "" => Err(ValidationError::VehicleNumberRequired),
        s if PLATE_RE.is_match(s) => Ok(()),
        _ => Err(ValidationError::InvalidVehicleNumber),
    }
}

/// Parses one group count. Accepts any finite, non-negative number; a
/// blank or whitespace-only count is missing.
fn parse_count(raw: &str) -> Result<f64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::CountRequired);
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Ok(n),
        _ => Err(ValidationError::InvalidCount),
    }
}

fn validate_group(counts: &GroupCounts, errors: &mut ValidationErrors) {
    let fields = [
        (FieldKey::Men, &counts.men),
        (FieldKey::Women, &counts.women),
        (FieldKey::Boys, &counts.boys),
        (FieldKey::Girls, &counts.girls),
    ];
    let mut total = 0.0;
    for (key, raw) in fields {
        match parse_count(raw) {
            Ok(n) => total += n,
            Err(e) => errors.insert(key, e),
        }
    }
    if total == 0.0 {
        errors.insert(FieldKey::GroupTotal, ValidationError::EmptyGroup);
    }
}

fn validate_vehicle(index: usize, vehicle: &VehicleEntry, errors: &mut ValidationErrors) {
    if !vehicle.has_input() {
        return;
    }
    if let Err(e) = validate_vehicle_number(&vehicle.number) {
        errors.insert(FieldKey::VehicleNumber(index), e);
    }
    if vehicle.kind.is_none() {
        errors.insert(FieldKey::VehicleType(index), ValidationError::VehicleTypeRequired);
    }
}

/// Validates the whole form, collecting one error per invalid field.
pub fn validate(values: &FormValues) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if let Err(e) = validate_full_name(&values.full_name) {
        errors.insert(FieldKey::FullName, e);
    }
    if let Err(e) = validate_phone(&values.phone) {
        errors.insert(FieldKey::Phone, e);
    }
    if let Err(e) = validate_email(&values.email) {
        errors.insert(FieldKey::Email, e);
    }
    if values.gender.is_none() {
        errors.insert(FieldKey::Gender, ValidationError::GenderRequired);
    }
    if let Err(e) = validate_departure(&values.departure, values.arrival) {
        errors.insert(FieldKey::Departure, e);
    }
    if let Members::Group(counts) = &values.members {
        validate_group(counts, &mut errors);
    }
    for (index, vehicle) in values.vehicles.iter().enumerate() {
        validate_vehicle(index, vehicle, &mut errors);
    }

    errors
}
