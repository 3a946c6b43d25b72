mod normalize;
mod validation;
mod vehicle;
mod visitor;

pub use normalize::{
    DATETIME_LOCAL_FORMAT, datetime_local, format_datetime_input, format_submission_datetime,
    format_vehicle_number, format_vehicle_type, normalize_phone, title_case_input, to_title_case,
};
pub use validation::{
    FieldKey, ValidationError, ValidationErrors, validate, validate_departure, validate_email,
    validate_full_name, validate_phone, validate_vehicle_number,
};
pub use vehicle::VehicleType;
pub use visitor::{FormValues, Gender, GroupCounts, HeadCounts, Members, Photo, VehicleEntry};
