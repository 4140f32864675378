//! API Key entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::expiration::{classify, ExpirationState};
use super::validation::{validate_api_key_id, ApiKeyValidationError};

/// API Key identifier - opaque, never reused.
///
/// Ids typed by an operator go through [`ApiKeyId::new`]; ids read back from
/// storage are taken verbatim so one odd record cannot void the collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ApiKeyId(String);

impl ApiKeyId {
    /// Create a new ApiKeyId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, ApiKeyValidationError> {
        let id = id.into();
        validate_api_key_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ApiKeyId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<ApiKeyId> for String {
    fn from(id: ApiKeyId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ApiKeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored access key.
///
/// Serialized as `{ id, key, note, createdAt, expiresAt }` with epoch
/// milliseconds and `null` for lifetime keys. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    id: ApiKeyId,
    /// The token itself
    key: String,
    #[serde(default)]
    note: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
    /// `None` = never expires
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    expires_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    pub fn new(
        id: ApiKeyId,
        key: impl Into<String>,
        note: impl Into<String>,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            key: key.into(),
            note: note.into(),
            created_at,
            expires_at,
        }
    }

    // Getters

    pub fn id(&self) -> &ApiKeyId {
        &self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    // Status checks

    /// Lifecycle state at `now`
    pub fn state(&self, now: DateTime<Utc>) -> ExpirationState {
        classify(self.expires_at, now)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.state(now).is_expired()
    }

    /// Case-insensitive substring match on token or note.
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.key.to_lowercase().contains(needle) || self.note.to_lowercase().contains(needle)
    }
}
