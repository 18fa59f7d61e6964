//! Reusable field validators
//!
//! Each validator checks one constraint and returns a [`ValidationError::Field`]
//! naming the field on failure. The aggregate validator chains them in a fixed
//! order and stops at the first failure.

use crate::core::error::ValidationError;
use chrono::{DateTime, Duration, Utc};

type FieldResult = Result<(), ValidationError>;

/// Validator: string must not be empty
pub fn required(field: &'static str, value: &str) -> FieldResult {
    if value.is_empty() {
        Err(ValidationError::field(field, "is required"))
    } else {
        Ok(())
    }
}

/// Validator: string must not exceed `max` characters
pub fn max_len(field: &'static str, value: &str, max: usize) -> FieldResult {
    if value.chars().count() > max {
        Err(ValidationError::field(
            field,
            format!("is too long (max {} characters)", max),
        ))
    } else {
        Ok(())
    }
}

/// Validator: string must not contain whitespace
pub fn no_whitespace(field: &'static str, value: &str) -> FieldResult {
    if value.chars().any(char::is_whitespace) {
        Err(ValidationError::field(field, "cannot contain whitespace"))
    } else {
        Ok(())
    }
}

/// Validator: number must be strictly positive
pub fn positive(field: &'static str, value: i64) -> FieldResult {
    if value <= 0 {
        Err(ValidationError::field(field, "must be greater than 0"))
    } else {
        Ok(())
    }
}

/// Validator: number must be zero or more
pub fn non_negative(field: &'static str, value: i64) -> FieldResult {
    if value < 0 {
        Err(ValidationError::field(field, "cannot be negative"))
    } else {
        Ok(())
    }
}

/// Validator: number must not exceed `max`
pub fn max_value(field: &'static str, value: i64, max: i64) -> FieldResult {
    if value > max {
        Err(ValidationError::field(field, "is too large"))
    } else {
        Ok(())
    }
}

/// Validator: loose email shape, must contain `@` and `.`
pub fn email_shape(field: &'static str, value: &str) -> FieldResult {
    if value.contains('@') && value.contains('.') {
        Ok(())
    } else {
        Err(ValidationError::field(field, "format is invalid"))
    }
}

/// Validator: timestamp must be set and not lie beyond `now + tolerance`
///
/// The unset value is the decoder default (unix epoch).
pub fn not_in_future(
    field: &'static str,
    value: DateTime<Utc>,
    now: DateTime<Utc>,
    tolerance: Duration,
) -> FieldResult {
    if value == DateTime::<Utc>::default() {
        return Err(ValidationError::field(field, "is required"));
    }
    if value > now + tolerance {
        return Err(ValidationError::field(field, "cannot be in the future"));
    }
    Ok(())
}
