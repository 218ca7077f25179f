//! Schema validation gate.
//!
//! Every mutating operation validates its input with these helpers before the
//! first store access; a failure short-circuits the operation entirely.

use copperleaf_core::{EmailError, Price};
use thiserror::Error;

/// Maximum length accepted for names, usernames, and address lines.
pub const MAX_TEXT_LENGTH: usize = 120;

/// Maximum length accepted for free-form text (descriptions, comments).
pub const MAX_BODY_LENGTH: usize = 2000;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors produced by the validation gate.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required text field is empty or whitespace.
    #[error("{field} cannot be empty")]
    Empty {
        /// Offending field name.
        field: &'static str,
    },

    /// A text field exceeds its maximum length.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Offending field name.
        field: &'static str,
        /// Maximum allowed length.
        max: usize,
    },

    /// A numeric field is below its minimum.
    #[error("{field} must be at least {min}")]
    TooSmall {
        /// Offending field name.
        field: &'static str,
        /// Minimum allowed value.
        min: u32,
    },

    /// A numeric field is outside its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        /// Offending field name.
        field: &'static str,
        /// Minimum allowed value.
        min: u32,
        /// Maximum allowed value.
        max: u32,
    },

    /// A monetary field is negative.
    #[error("{field} cannot be negative")]
    NegativeAmount {
        /// Offending field name.
        field: &'static str,
    },

    /// Password does not meet the minimum length.
    #[error("password must be at least {min} characters")]
    WeakPassword {
        /// Minimum allowed length.
        min: usize,
    },

    /// Email failed structural validation.
    #[error(transparent)]
    Email(#[from] EmailError),
}

/// Require a non-empty text field within `max` characters.
///
/// # Errors
///
/// Returns [`ValidationError::Empty`] or [`ValidationError::TooLong`].
pub fn require_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.len() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

/// Require a numeric field to be at least `min`.
///
/// # Errors
///
/// Returns [`ValidationError::TooSmall`].
pub fn require_min(field: &'static str, value: u32, min: u32) -> Result<(), ValidationError> {
    if value < min {
        return Err(ValidationError::TooSmall { field, min });
    }
    Ok(())
}

/// Require a numeric field to lie within `min..=max`.
///
/// # Errors
///
/// Returns [`ValidationError::OutOfRange`].
pub fn require_range(
    field: &'static str,
    value: u32,
    min: u32,
    max: u32,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange { field, min, max });
    }
    Ok(())
}

/// Require a non-negative monetary amount.
///
/// # Errors
///
/// Returns [`ValidationError::NegativeAmount`].
pub fn require_non_negative(field: &'static str, price: Price) -> Result<(), ValidationError> {
    if price.is_negative() {
        return Err(ValidationError::NegativeAmount { field });
    }
    Ok(())
}

/// Require a password meeting the minimum length.
///
/// # Errors
///
/// Returns [`ValidationError::WeakPassword`].
pub fn require_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::WeakPassword {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_require_text() {
        assert!(require_text("name", "Copper Kettle", MAX_TEXT_LENGTH).is_ok());
        assert!(matches!(
            require_text("name", "   ", MAX_TEXT_LENGTH),
            Err(ValidationError::Empty { field: "name" })
        ));
        assert!(matches!(
            require_text("name", &"x".repeat(121), MAX_TEXT_LENGTH),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_require_min() {
        assert!(require_min("quantity", 1, 1).is_ok());
        assert!(matches!(
            require_min("quantity", 0, 1),
            Err(ValidationError::TooSmall { .. })
        ));
    }

    #[test]
    fn test_require_range() {
        assert!(require_range("rating", 5, 1, 5).is_ok());
        assert!(require_range("rating", 6, 1, 5).is_err());
        assert!(require_range("rating", 0, 1, 5).is_err());
    }

    #[test]
    fn test_require_non_negative() {
        assert!(require_non_negative("price", Price::ZERO).is_ok());
        assert!(require_non_negative("price", Price::new(Decimal::new(-1, 2))).is_err());
    }

    #[test]
    fn test_require_password() {
        assert!(require_password("long-enough").is_ok());
        assert!(matches!(
            require_password("short"),
            Err(ValidationError::WeakPassword { min: 8 })
        ));
    }
}
