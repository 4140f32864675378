//! API key input validation and normalization

use thiserror::Error;

/// Errors that can occur during API key validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiKeyValidationError {
    #[error("API key ID cannot be empty")]
    EmptyId,

    #[error("API key ID cannot contain whitespace")]
    WhitespaceInId,

    #[error("Unsupported key duration: {0} days. Allowed: 0, 1, 7, 30, 365")]
    UnsupportedDuration(u32),
}

pub const MIN_KEY_LENGTH: usize = 10;
pub const MAX_KEY_LENGTH: usize = 64;
pub const DEFAULT_KEY_LENGTH: usize = 15;

pub const MIN_QUANTITY: usize = 1;
pub const MAX_QUANTITY: usize = 100;
pub const DEFAULT_QUANTITY: usize = 1;

/// Validate an API key ID
///
/// IDs are opaque, but they must be non-empty and free of whitespace so they
/// can be typed back on the command line.
pub fn validate_api_key_id(id: &str) -> Result<(), ApiKeyValidationError> {
    if id.is_empty() {
        return Err(ApiKeyValidationError::EmptyId);
    }

    if id.chars().any(char::is_whitespace) {
        return Err(ApiKeyValidationError::WhitespaceInId);
    }

    Ok(())
}

/// Normalize a raw token length. Non-numeric or out-of-range input yields the default.
pub fn normalize_length(raw: &str) -> usize {
    raw.trim()
        .parse::<i64>()
        .map(normalize_length_value)
        .unwrap_or(DEFAULT_KEY_LENGTH)
}

pub fn normalize_length_value(value: i64) -> usize {
    bounded(value, MIN_KEY_LENGTH, MAX_KEY_LENGTH).unwrap_or(DEFAULT_KEY_LENGTH)
}

/// Normalize a raw batch size. Non-numeric or out-of-range input yields the default.
pub fn normalize_quantity(raw: &str) -> usize {
    raw.trim()
        .parse::<i64>()
        .map(normalize_quantity_value)
        .unwrap_or(DEFAULT_QUANTITY)
}

pub fn normalize_quantity_value(value: i64) -> usize {
    bounded(value, MIN_QUANTITY, MAX_QUANTITY).unwrap_or(DEFAULT_QUANTITY)
}

fn bounded(value: i64, min: usize, max: usize) -> Option<usize> {
    usize::try_from(value)
        .ok()
        .filter(|v| (min..=max).contains(v))
}
