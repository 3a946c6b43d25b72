use chrono::NaiveDateTime;
use serde_json::{Value, json};

use crate::model::{FormValues, Photo, datetime_local, format_submission_datetime};

/// One entry of `Vehicles_Information`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleInfo {
    pub number: String,
    pub kind: String,
}

/// The record posted to the intake endpoint, shaped from validated form values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub full_name: String,
    pub phone_number: String,
    pub gender: String,
    pub expected_arrival: String,
    pub expected_departure: String,
    pub men: String,
    pub women: String,
    pub boys: String,
    pub girls: String,
    pub email: Option<String>,
    pub vehicles: Option<Vec<VehicleInfo>>,
    pub photo: Option<Photo>,
}

/// A record field value, before multipart encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Json(Value),
    File(Photo),
}

impl SubmissionRecord {
    /// Shapes `values` for submission at `submitted_at`.
    ///
    /// The arrival stamp is the submission time, not the time the form was
    /// opened. Vehicle rows without input are dropped.
    pub fn from_values(values: &FormValues, submitted_at: NaiveDateTime) -> Self {
        let counts = values.head_counts();
        let vehicles: Vec<VehicleInfo> = values
            .filled_vehicles()
            .map(|v| VehicleInfo {
                number: v.number.trim().to_string(),
                kind: v.kind.map(|k| k.submission_label()).unwrap_or_default(),
            })
            .collect();
        let email = values.email.trim();

        Self {
            full_name: values.full_name.trim().to_string(),
            phone_number: if values.phone.is_empty() {
                String::new()
            } else {
                format!("+{}", values.phone)
            },
            gender: values
                .gender
                .map(|g| g.as_str().to_string())
                .unwrap_or_default(),
            expected_arrival: format_submission_datetime(&datetime_local(submitted_at)),
            expected_departure: format_submission_datetime(&values.departure),
            men: counts.men,
            women: counts.women,
            boys: counts.boys,
            girls: counts.girls,
            email: (!email.is_empty()).then(|| email.to_string()),
            vehicles: (!vehicles.is_empty()).then_some(vehicles),
            photo: values.photo.clone(),
        }
    }

    /// Lists the record's fields under their wire names, in submission order.
    ///
    /// `Visitor_s_Photo` is only present when a photo was attached.
    pub fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        let text = |s: &str| FieldValue::Text(s.to_string());
        let mut fields = vec![
            ("Full_Name", text(&self.full_name)),
            ("Phone_Number", text(&self.phone_number)),
            ("Gender", text(&self.gender)),
            ("Expected_Arrival_Date_Time", text(&self.expected_arrival)),
            ("Expected_Departure_Date_Time", text(&self.expected_departure)),
            ("Number_of_Men", text(&self.men)),
            ("Number_of_Women", text(&self.women)),
            ("Number_of_Boys", text(&self.boys)),
            ("Number_of_Girls", text(&self.girls)),
            (
                "Email",
                self.email.as_deref().map_or(FieldValue::Null, text),
            ),
            (
                "Vehicles_Information",
                self.vehicles
                    .as_ref()
                    .map_or(FieldValue::Null, |v| FieldValue::Json(vehicles_json(v))),
            ),
        ];
        if let Some(photo) = &self.photo {
            fields.push(("Visitor_s_Photo", FieldValue::File(photo.clone())));
        }
        fields
    }
}

fn vehicles_json(vehicles: &[VehicleInfo]) -> Value {
    Value::Array(
        vehicles
            .iter()
            .map(|v| json!({ "Vehicle_Number": v.number, "Vehicle_Type": v.kind }))
            .collect(),
    )
}
