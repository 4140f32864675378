//! Generation request and key duration

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{
    normalize_length, normalize_length_value, normalize_quantity, normalize_quantity_value,
    ApiKeyValidationError, DEFAULT_KEY_LENGTH, DEFAULT_QUANTITY,
};

/// Lifetime of a generated key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum KeyDuration {
    OneDay,
    #[default]
    SevenDays,
    ThirtyDays,
    OneYear,
    /// Never expires
    Lifetime,
}

impl KeyDuration {
    /// Parse the number of days; `0` selects [`KeyDuration::Lifetime`]
    pub fn from_days(days: u32) -> Result<Self, ApiKeyValidationError> {
        match days {
            0 => Ok(Self::Lifetime),
            1 => Ok(Self::OneDay),
            7 => Ok(Self::SevenDays),
            30 => Ok(Self::ThirtyDays),
            365 => Ok(Self::OneYear),
            other => Err(ApiKeyValidationError::UnsupportedDuration(other)),
        }
    }

    /// Number of days, `0` for lifetime keys
    pub fn days(&self) -> u32 {
        match self {
            Self::OneDay => 1,
            Self::SevenDays => 7,
            Self::ThirtyDays => 30,
            Self::OneYear => 365,
            Self::Lifetime => 0,
        }
    }

    /// Expiry for a key created at `created_at`, `None` for lifetime keys
    pub fn expiry_from(&self, created_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Lifetime => None,
            finite => Some(created_at + Duration::days(i64::from(finite.days()))),
        }
    }

    pub fn is_lifetime(&self) -> bool {
        matches!(self, Self::Lifetime)
    }

    /// Short badge used in previews
    pub fn badge(&self) -> String {
        match self {
            Self::Lifetime => "LIFETIME".to_string(),
            finite => format!("{}D", finite.days()),
        }
    }
}

impl TryFrom<u32> for KeyDuration {
    type Error = ApiKeyValidationError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        Self::from_days(days)
    }
}

impl From<KeyDuration> for u32 {
    fn from(duration: KeyDuration) -> Self {
        duration.days()
    }
}

impl std::fmt::Display for KeyDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneDay => write!(f, "1 Day (Trial)"),
            Self::SevenDays => write!(f, "7 Days"),
            Self::ThirtyDays => write!(f, "30 Days"),
            Self::OneYear => write!(f, "365 Days (1 Year)"),
            Self::Lifetime => write!(f, "Lifetime"),
        }
    }
}

/// Parameters for one generated batch. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    length: usize,
    quantity: usize,
    note: String,
    duration: KeyDuration,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            length: DEFAULT_KEY_LENGTH,
            quantity: DEFAULT_QUANTITY,
            note: String::new(),
            duration: KeyDuration::default(),
        }
    }
}

impl GenerationRequest {
    /// Build a request from raw operator input.
    ///
    /// Bad numbers fall back to defaults, an unknown duration to 7 days.
    pub fn from_raw(
        length: &str,
        quantity: &str,
        note: impl Into<String>,
        duration_days: &str,
    ) -> Self {
        let duration = duration_days
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(|days| KeyDuration::from_days(days).ok())
            .unwrap_or_default();

        Self {
            length: normalize_length(length),
            quantity: normalize_quantity(quantity),
            note: note.into(),
            duration,
        }
    }

    /// Set the token length, normalizing out-of-range values
    pub fn with_length(mut self, length: i64) -> Self {
        self.length = normalize_length_value(length);
        self
    }

    /// Set the batch size, normalizing out-of-range values
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = normalize_quantity_value(quantity);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_duration(mut self, duration: KeyDuration) -> Self {
        self.duration = duration;
        self
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn quantity(&self) -> usize {
        self.quantity
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn duration(&self) -> KeyDuration {
        self.duration
    }
}
