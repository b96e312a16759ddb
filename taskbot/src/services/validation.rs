// File: taskbot/src/services/validation.rs
use crate::errors::ValidationError;

/// Trims `value` and checks it is non-empty and at most `max` characters
pub fn require_text(field: &str, value: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField {
            field: field.to_string(),
        });
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(trimmed.to_string())
}

/// Like [`require_text`] but blank input means "not given"
pub fn optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => require_text(field, v, max).map(Some),
        None => Ok(None),
    }
}
