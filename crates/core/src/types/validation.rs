//! Field validation errors shared by the domain records.

use thiserror::Error;

/// A record field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field is empty.
    #[error("{field} cannot be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A numeric field is negative, NaN or infinite.
    #[error("{field} must be a non-negative finite number")]
    InvalidAmount {
        /// Name of the offending field.
        field: &'static str,
    },

    /// An order position asks for zero items.
    #[error("position {index} must have a positive quantity")]
    ZeroQuantity {
        /// Zero-based index of the position in the order.
        index: usize,
    },
}

/// Check that a text field is not blank.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

/// Check that an amount is finite and not negative.
pub(crate) fn require_amount(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidAmount { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text() {
        assert!(require_text("name", "Hot Summer").is_ok());
        assert_eq!(
            require_text("name", "   "),
            Err(ValidationError::EmptyField { field: "name" })
        );
    }

    #[test]
    fn test_require_amount() {
        assert!(require_amount("price", 0.0).is_ok());
        assert!(require_amount("price", 35.4).is_ok());
        assert!(require_amount("price", -0.01).is_err());
        assert!(require_amount("price", f64::NAN).is_err());
        assert!(require_amount("price", f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::InvalidAmount { field: "weight" }.to_string(),
            "weight must be a non-negative finite number"
        );
        assert_eq!(
            ValidationError::ZeroQuantity { index: 2 }.to_string(),
            "position 2 must have a positive quantity"
        );
    }
}
