//! Attribute value validation utilities.
//!
//! Free functions returning [`validator::ValidationError`] with coded
//! messages. The per-type dispatch lives in the domain crate; these
//! validators only know about the concrete value formats.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)+$")
            .expect("invalid email regex");
    static ref TEL_RE: Regex =
        Regex::new(r"^\+?[0-9][0-9 \-]{5,17}$").expect("invalid tel regex");
    static ref COLOR_RE: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").expect("invalid color regex");
}

/// Validates an email address.
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("email_format");
        err.message = Some("Invalid email address".into());
        Err(err)
    }
}

/// Validates a telephone number (optional leading +, digits, spaces, dashes).
pub fn validate_tel(value: &str) -> Result<(), ValidationError> {
    if TEL_RE.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("tel_format");
        err.message = Some("Invalid telephone number".into());
        Err(err)
    }
}

/// Validates a hex color in `#rrggbb` form.
pub fn validate_color(value: &str) -> Result<(), ValidationError> {
    if COLOR_RE.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("color_format");
        err.message = Some("Color must be in #rrggbb format".into());
        Err(err)
    }
}

/// Validates an ISO calendar date (`YYYY-MM-DD`).
pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        Ok(())
    } else {
        let mut err = ValidationError::new("date_format");
        err.message = Some("Date must be in YYYY-MM-DD format".into());
        Err(err)
    }
}

/// Validates a wall-clock time (`HH:MM` or `HH:MM:SS`).
pub fn validate_time(value: &str) -> Result<(), ValidationError> {
    let ok = NaiveTime::parse_from_str(value, "%H:%M").is_ok()
        || NaiveTime::parse_from_str(value, "%H:%M:%S").is_ok();
    if ok {
        Ok(())
    } else {
        let mut err = ValidationError::new("time_format");
        err.message = Some("Time must be in HH:MM format".into());
        Err(err)
    }
}

/// Validates a local datetime (`YYYY-MM-DDTHH:MM`, seconds optional).
pub fn validate_datetime(value: &str) -> Result<(), ValidationError> {
    let ok = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok();
    if ok {
        Ok(())
    } else {
        let mut err = ValidationError::new("datetime_format");
        err.message = Some("Datetime must be in YYYY-MM-DDTHH:MM format".into());
        Err(err)
    }
}

/// Validates that a numeric value is finite.
pub fn validate_number(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        let mut err = ValidationError::new("number_range");
        err.message = Some("Number must be finite".into());
        Err(err)
    }
}

/// Validates that a value is one of the allowed options.
pub fn validate_option_membership(value: &str, options: &[String]) -> Result<(), ValidationError> {
    if options.iter().any(|o| o == value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("option_membership");
        err.message = Some("Value is not one of the allowed options".into());
        Err(err)
    }
}
