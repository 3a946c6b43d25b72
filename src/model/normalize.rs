//! Input normalizers applied as the visitor types, and formatters applied
//! when building the submission.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

static PLATE_SEGMENTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]{0,2})([0-9]{0,2})([A-Z]{0,3})([0-9]{0,4})").expect("valid hardcoded regex")
});

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Layout of the local date-time text held by the departure field.
pub const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Capitalizes every whitespace-delimited word and collapses whitespace.
///
/// `"  john   DOE  "` becomes `"John Doe"`.
pub fn to_title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Title-cases a name while it is being typed.
///
/// Same as [`to_title_case`], except a single trailing space survives so the
/// next word can be typed.
pub fn title_case_input(value: &str) -> String {
    let mut cased = to_title_case(value);
    if !cased.is_empty() && value.ends_with(char::is_whitespace) {
        cased.push(' ');
    }
    cased
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Keeps only the ASCII digits of a phone number.
pub fn normalize_phone(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Progressively formats a registration plate as it is typed.
///
/// Strips everything but uppercase alphanumerics, then splits the result
/// into state code, district code, series and unique number, joining the
/// non-empty groups with single spaces. Input beyond the last group is
/// dropped.
pub fn format_vehicle_number(value: &str) -> String {
    let cleaned: String = value
        .to_uppercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    let Some(caps) = PLATE_SEGMENTS_RE.captures(&cleaned) else {
        return String::new();
    };
    caps.iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str())
        .filter(|group| !group.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Maps a vehicle-type token to the label sent on submission.
pub fn format_vehicle_type(token: &str) -> String {
    match token {
        "" => String::new(),
        "two-wheeler" => "Two Wheeler".to_string(),
        other => to_title_case(&other.replace('-', " ")),
    }
}

/// Formats a `YYYY-MM-DDTHH:MM` value as `DD-Mon-YYYY HH:MM`.
///
/// Returns the input unchanged when it has no date or time part, or when the
/// month is not in `1..=12`.
pub fn format_submission_datetime(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let Some((date, time)) = value.split_once('T') else {
        return value.to_string();
    };
    if date.is_empty() || time.is_empty() {
        return value.to_string();
    }

    let mut date_parts = date.split('-');
    let year = date_parts.next().unwrap_or_default();
    let month = date_parts.next().unwrap_or_default();
    let day = date_parts.next().unwrap_or_default();

    let mut time_parts = time.split(':');
    let hour = time_parts.next().unwrap_or_default();
    let minute = time_parts.next().unwrap_or_default();

    match month.parse::<usize>() {
        Ok(m @ 1..=12) => format!("{day}-{}-{year} {hour}:{minute}", MONTHS[m - 1]),
        _ => value.to_string(),
    }
}

/// Renders a timestamp as local date-time text (`YYYY-MM-DDTHH:MM`).
pub fn datetime_local(at: NaiveDateTime) -> String {
    at.format(DATETIME_LOCAL_FORMAT).to_string()
}

/// Masks typed digits into `YYYY-MM-DDTHH:MM`.
///
/// Separators are only inserted once a digit follows them, so deleting the
/// last character always removes a digit.
pub fn format_datetime_input(value: &str) -> String {
    let mut out = String::with_capacity(16);
    for (i, digit) in value.chars().filter(char::is_ascii_digit).take(12).enumerate() {
        match i {
            4 | 6 => out.push('-'),
            8 => out.push('T'),
            10 => out.push(':'),
            _ => {}
        }
        out.push(digit);
    }
    out
}
