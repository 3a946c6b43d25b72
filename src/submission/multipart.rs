use reqwest::multipart::{Form, Part};

use super::error::SubmitError;
use super::record::{FieldValue, SubmissionRecord};
use crate::model::Photo;

/// Body of one multipart part.
#[derive(Debug, Clone, PartialEq)]
pub enum PartBody {
    Text(String),
    File(Photo),
}

/// One named part of the submission body.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartPart {
    pub name: &'static str,
    pub body: PartBody,
}

/// Encodes a record field by field.
///
/// Nulls become the literal text `null`, photos become file parts, JSON
/// values are serialized to text and everything else is sent as-is.
pub fn encode_parts(record: &SubmissionRecord) -> Vec<MultipartPart> {
    record
        .fields()
        .into_iter()
        .map(|(name, value)| {
            let body = match value {
                FieldValue::Null => PartBody::Text("null".to_string()),
                FieldValue::Text(text) => PartBody::Text(text),
                FieldValue::Json(json) => PartBody::Text(json.to_string()),
                FieldValue::File(photo) => PartBody::File(photo),
            };
            MultipartPart { name, body }
        })
        .collect()
}

/// Builds the `multipart/form-data` body from encoded parts.
pub fn into_form(parts: Vec<MultipartPart>) -> Result<Form, SubmitError> {
    parts.into_iter().try_fold(Form::new(), |form, part| {
        Ok(match part.body {
            PartBody::Text(text) => form.text(part.name, text),
            PartBody::File(photo) => {
                let file = Part::bytes(photo.bytes.to_vec())
                    .file_name(photo.file_name)
                    .mime_str(&photo.content_type)
                    .map_err(|_| SubmitError::InvalidPhotoType(photo.content_type.clone()))?;
                form.part(part.name, file)
            }
        })
    })
}
