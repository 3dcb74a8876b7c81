//! Validation error types

use std::fmt;

/// Validation error for entity payloads and query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is missing or blank
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Value is outside the accepted range or shape
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Value is not one of the whitelisted variants
    InvalidVariant { field: &'static str, value: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::InvalidVariant { field, value } => {
                write!(f, "invalid {} value: '{}'", field, value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum length for free-text name-like attributes
pub const MAX_TEXT_LEN: usize = 128;

/// Check a required text attribute: non-blank and within [`MAX_TEXT_LEN`].
pub fn required_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }

    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_TEXT_LEN,
        });
    }

    Ok(())
}

/// Same as [`required_text`] but only when the value was supplied.
pub fn optional_text(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(v) => required_text(field, v),
        None => Ok(()),
    }
}
