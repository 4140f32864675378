//! Domain layer - Core entities and policies

pub mod api_key;
pub mod clock;
pub mod error;
pub mod storage;

pub use api_key::{
    classify, ApiKey, ApiKeyId, ApiKeyValidationError, ExpirationState, GenerationRequest,
    KeyDuration,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::DomainError;
pub use storage::KeyValueStorage;
