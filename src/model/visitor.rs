use std::fmt;

use bytes::Bytes;
use chrono::NaiveDateTime;

use super::vehicle::VehicleType;

/// Visitor gender as selected on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Returns the value sent to the intake endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

#[mutants::skip]
impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => f.write_str("Male"),
            Gender::Female => f.write_str("Female"),
        }
    }
}

/// Raw per-category head counts typed for a group visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCounts {
    pub men: String,
    pub women: String,
    pub boys: String,
    pub girls: String,
}

impl GroupCounts {
    /// All four counts set to `"0"`, the starting point for a new group.
    pub fn zeroed() -> Self {
        Self {
            men: "0".into(),
            women: "0".into(),
            boys: "0".into(),
            girls: "0".into(),
        }
    }
}

/// Whether the visitor comes alone or with a group.
///
/// A single visitor has no editable counts: they follow from the gender.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Members {
    #[default]
    Single,
    Group(GroupCounts),
}

impl Members {
    pub fn is_group(&self) -> bool {
        matches!(self, Members::Group(_))
    }
}

/// Head counts as they are submitted, one string per category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadCounts {
    pub men: String,
    pub women: String,
    pub boys: String,
    pub girls: String,
}

/// One row of the vehicle list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VehicleEntry {
    pub number: String,
    pub kind: Option<VehicleType>,
}

impl VehicleEntry {
    /// Returns `true` once either field carries input.
    pub fn has_input(&self) -> bool {
        !self.number.trim().is_empty() || self.kind.is_some()
    }
}

/// A visitor photo, captured from the camera or picked from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl Photo {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// Everything typed into the registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    pub full_name: String,
    /// Digits only, country code included.
    pub phone: String,
    pub email: String,
    pub photo: Option<Photo>,
    pub gender: Option<Gender>,
    /// Earliest allowed departure: when the form was opened, moved to the
    /// submit time on each submit attempt.
    pub arrival: NaiveDateTime,
    /// Local date-time text, `YYYY-MM-DDTHH:MM`.
    pub departure: String,
    pub members: Members,
    pub vehicles: Vec<VehicleEntry>,
}

impl FormValues {
    /// Creates an empty form opened at `arrival`.
    pub fn new(arrival: NaiveDateTime) -> Self {
        Self {
            full_name: String::new(),
            phone: String::new(),
            email: String::new(),
            photo: None,
            gender: None,
            arrival,
            departure: String::new(),
            members: Members::Single,
            vehicles: Vec::new(),
        }
    }

    /// Returns the four head counts.
    ///
    /// For a single visitor, `1` goes to men or women according to the
    /// gender and everything else is `0`.
    pub fn head_counts(&self) -> HeadCounts {
        match &self.members {
            Members::Group(counts) => HeadCounts {
                men: counts.men.clone(),
                women: counts.women.clone(),
                boys: counts.boys.clone(),
                girls: counts.girls.clone(),
            },
            Members::Single => {
                let one_if = |g: Gender| -> String {
                    let count = if self.gender == Some(g) { "1" } else { "0" };
                    count.to_string()
                };
                HeadCounts {
                    men: one_if(Gender::Male),
                    women: one_if(Gender::Female),
                    boys: "0".into(),
                    girls: "0".into(),
                }
            }
        }
    }

    /// Vehicle rows that carry input, in order.
    pub fn filled_vehicles(&self) -> impl Iterator<Item = &VehicleEntry> {
        self.vehicles.iter().filter(|v| v.has_input())
    }
}
