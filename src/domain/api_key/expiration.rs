//! Expiration policy

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle state of a key at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpirationState {
    /// Key has no expiry
    Lifetime,
    /// Key expires in the future (or exactly now)
    Active,
    /// Expiry lies strictly in the past
    Expired,
}

impl ExpirationState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Lifetime => "Lifetime",
            Self::Active => "Active",
            Self::Expired => "Expired",
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }
}

impl std::fmt::Display for ExpirationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify an expiry against `now`.
///
/// `now == expires_at` is still active; only a strictly later `now` expires.
pub fn classify(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> ExpirationState {
    match expires_at {
        None => ExpirationState::Lifetime,
        Some(expires_at) if now > expires_at => ExpirationState::Expired,
        Some(_) => ExpirationState::Active,
    }
}
