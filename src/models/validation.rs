//! Input validation errors

use thiserror::Error;

/// Rejected input at the record/goal boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Malformed payload: {0}")]
    Malformed(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Field '{field}' {reason}")]
    Field { field: &'static str, reason: String },

    #[error("Field '{0}' is required")]
    Missing(&'static str),
}

impl ValidationError {
    pub fn field(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::Field {
            field,
            reason: reason.into(),
        }
    }
}

pub(crate) fn check_positive(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => Err(ValidationError::field(field, "must be a positive number")),
        _ => Ok(()),
    }
}

pub(crate) fn check_non_negative(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(ValidationError::field(field, "must not be negative")),
        _ => Ok(()),
    }
}

/// Upper bound for step and energy counts
pub const MAX_COUNT: i64 = 1_000_000_000;

/// Non-negative whole number up to `MAX_COUNT`, converted to i64
pub(crate) fn check_count(field: &'static str, value: Option<f64>) -> Result<Option<i64>, ValidationError> {
    match value {
        None => Ok(None),
        Some(v) if !v.is_finite() || v < 0.0 || v.fract() != 0.0 => {
            Err(ValidationError::field(field, "must be a non-negative whole number"))
        }
        Some(v) if v > MAX_COUNT as f64 => Err(count_too_large(field)),
        Some(v) => Ok(Some(v as i64)),
    }
}

/// Same bounds as `check_count` for already-typed counts
pub(crate) fn check_count_i64(field: &'static str, value: Option<i64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if v < 0 => Err(ValidationError::field(field, "must not be negative")),
        Some(v) if v > MAX_COUNT => Err(count_too_large(field)),
        _ => Ok(()),
    }
}

fn count_too_large(field: &'static str) -> ValidationError {
    ValidationError::field(field, format!("must not exceed {}", MAX_COUNT))
}

pub(crate) fn check_band(
    field: &'static str,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<(), ValidationError> {
    check_non_negative(field, min)?;
    check_non_negative(field, max)?;
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(ValidationError::field(field, format!("minimum {} exceeds maximum {}", min, max)));
        }
    }
    Ok(())
}
