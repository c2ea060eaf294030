//! Validation error types

use std::fmt;

/// Validation error for domain values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field is shorter than allowed
    TooShort { field: &'static str, min: usize },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Invalid enum variant
    InvalidVariant { field: &'static str, value: String },

    /// Unique value already in use
    Taken { field: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooShort { field, min } => {
                write!(f, "{} must be at least {} characters", field, min)
            }
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::InvalidVariant { field, value } => {
                write!(f, "invalid {} value: '{}'", field, value)
            }
            Self::Taken { field } => write!(f, "{} already taken", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a trimmed value against `min..=max` characters.
pub(crate) fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len == 0 {
        return Err(ValidationError::Empty { field });
    }
    if len < min {
        return Err(ValidationError::TooShort { field, min });
    }
    if len > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "wallpaper name",
            max: 100,
        };
        assert_eq!(
            err.to_string(),
            "wallpaper name exceeds maximum length of 100 characters"
        );
        assert_eq!(
            ValidationError::Taken { field: "username" }.to_string(),
            "username already taken"
        );
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        assert!(check_length("name", "żółw", 2, 4).is_ok());
        assert_eq!(
            check_length("name", "a", 2, 4),
            Err(ValidationError::TooShort { field: "name", min: 2 })
        );
    }
}
