use chrono::{NaiveDate, NaiveDateTime};

use crate::models::event::types::parse_datetime;

/// Validate an email: must contain '@' and '.', max 254 chars.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email is required".to_string());
    }
    if trimmed.len() > 254 {
        return Some("Email must be at most 254 characters".to_string());
    }
    if !trimmed.contains('@') || !trimmed.contains('.') {
        return Some("Email must be a valid address (contain '@' and '.')".to_string());
    }
    None
}

/// Validate a password: min 8 chars on create.
pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.len() < 8 {
        return Some("Password must be at least 8 characters".to_string());
    }
    None
}

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.len() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if !trimmed.is_empty() && trimmed.len() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate one-of membership for enum-like string fields.
pub fn validate_one_of(value: &str, field_name: &str, allowed: &[&str]) -> Option<String> {
    if allowed.contains(&value) {
        None
    } else {
        Some(format!("{field_name} must be one of: {}", allowed.join(", ")))
    }
}

/// Parse an ISO date (YYYY-MM-DD), producing a field error on failure.
pub fn parse_date(value: &str, field_name: &str) -> Result<NaiveDate, String> {
    value
        .trim()
        .parse::<NaiveDate>()
        .map_err(|_| format!("{field_name} must be an ISO date (YYYY-MM-DD)"))
}

/// Parse an ISO datetime (YYYY-MM-DDTHH:MM:SS), producing a field error on failure.
pub fn parse_datetime_field(value: &str, field_name: &str) -> Result<NaiveDateTime, String> {
    parse_datetime(value.trim())
        .map_err(|_| format!("{field_name} must be an ISO datetime (YYYY-MM-DDTHH:MM:SS)"))
}
