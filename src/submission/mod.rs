//! Shaping validated form values into the intake record and posting it.
//!
//! [`SubmissionRecord`] is built from [`FormValues`](crate::model::FormValues),
//! encoded into multipart parts by [`encode_parts`], and sent by
//! [`IntakeClient`] as a single authenticated `POST`.

mod client;
mod error;
mod multipart;
mod record;

pub use client::{INTAKE_PATH, IntakeClient};
pub use error::SubmitError;
pub use multipart::{MultipartPart, PartBody, encode_parts, into_form};
pub use record::{FieldValue, SubmissionRecord, VehicleInfo};
