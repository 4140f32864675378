//! API Key domain
//!
//! Key records, generation requests, durations and the expiration policy.

mod entity;
mod expiration;
mod request;
mod validation;

pub use entity::{ApiKey, ApiKeyId};
pub use expiration::{classify, ExpirationState};
pub use request::{GenerationRequest, KeyDuration};
pub use validation::{
    normalize_length, normalize_length_value, normalize_quantity, normalize_quantity_value,
    validate_api_key_id, ApiKeyValidationError, DEFAULT_KEY_LENGTH, DEFAULT_QUANTITY,
    MAX_KEY_LENGTH, MAX_QUANTITY, MIN_KEY_LENGTH, MIN_QUANTITY,
};
