//! Input validation helpers.
//!
//! Standardizes validation across the crate using `!is_finite()` to reject
//! NaN, +Inf, and -Inf uniformly.

use crate::error::ImpliedVolError;
use crate::pricing::crr::MAX_STEPS;

/// Validate that a value is strictly positive and finite (rejects NaN, Inf, zero, negatives).
pub(crate) fn validate_positive(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ImpliedVolError::InvalidInput {
            message: format!("{name} must be positive and finite, got {value}"),
        });
    }
    Ok(value)
}

/// Validate that a value is non-negative and finite (rejects NaN, Inf, negatives).
pub(crate) fn validate_non_negative(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(ImpliedVolError::InvalidInput {
            message: format!("{name} must be non-negative and finite, got {value}"),
        });
    }
    Ok(value)
}

/// Validate that a value is finite (rejects NaN and Inf; allows zero and negatives).
pub(crate) fn validate_finite(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() {
        return Err(ImpliedVolError::InvalidInput {
            message: format!("{name} must be finite, got {value}"),
        });
    }
    Ok(value)
}

/// Validate a lattice step count (between 1 and [`MAX_STEPS`]).
pub(crate) fn validate_steps(steps: usize) -> crate::error::Result<usize> {
    if steps == 0 || steps > MAX_STEPS {
        return Err(ImpliedVolError::InvalidInput {
            message: format!("lattice steps must be in 1..={MAX_STEPS}, got {steps}"),
        });
    }
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_zero_nan_and_inf() {
        assert!(validate_positive(0.0, "x").is_err());
        assert!(validate_positive(-1.0, "x").is_err());
        assert!(validate_positive(f64::NAN, "x").is_err());
        assert!(validate_positive(f64::INFINITY, "x").is_err());
        assert_eq!(validate_positive(2.5, "x").unwrap(), 2.5);
    }

    #[test]
    fn non_negative_allows_zero() {
        assert_eq!(validate_non_negative(0.0, "x").unwrap(), 0.0);
        assert!(validate_non_negative(-1e-12, "x").is_err());
    }

    #[test]
    fn finite_allows_negative() {
        assert_eq!(validate_finite(-0.01, "rate").unwrap(), -0.01);
        assert!(validate_finite(f64::NEG_INFINITY, "rate").is_err());
    }

    #[test]
    fn message_names_the_field() {
        let err = validate_positive(-3.0, "strike").unwrap_err();
        assert!(format!("{err}").contains("strike"));
    }

    #[test]
    fn steps_must_be_non_zero() {
        assert!(validate_steps(0).is_err());
        assert_eq!(validate_steps(1).unwrap(), 1);
    }

    #[test]
    fn steps_bounded_above() {
        assert_eq!(validate_steps(MAX_STEPS).unwrap(), MAX_STEPS);
        assert!(validate_steps(MAX_STEPS + 1).is_err());
        let err = validate_steps(usize::MAX).unwrap_err();
        assert!(format!("{err}").contains("lattice steps"));
    }
}
