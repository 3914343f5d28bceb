//! Validation helper functions for configuration types.

use crate::core::errors::{LiteralistError, Result};

/// Validate that a usize value is greater than zero.
pub fn validate_positive_usize(value: usize, field: &str) -> Result<()> {
    if value == 0 {
        return Err(LiteralistError::config_field(
            format!("{} must be greater than 0", field),
            field,
        ));
    }
    Ok(())
}

/// Validate that a string setting is not blank.
pub fn validate_non_empty(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LiteralistError::config_field(
            format!("{} must not be empty", field),
            field,
        ));
    }
    Ok(())
}
