//! Key store
//!
//! Owns the ordered collection of keys (newest first) and mirrors it to a
//! [`KeyValueStorage`] entry after every mutation. The whole collection is
//! written as one JSON array each time.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::api_key::{ApiKey, ApiKeyId};
use crate::domain::storage::KeyValueStorage;
use crate::domain::DomainError;

/// Storage entry the collection lives under
pub const DEFAULT_NAMESPACE: &str = "lua_auth_keys";

/// Proof that the operator agreed to wipe every key.
///
/// [`KeyStore::delete_all`] cannot be called without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WipeConfirmation {
    _private: (),
}

impl WipeConfirmation {
    /// Confirmation given up front, e.g. through a `--yes` flag
    pub fn affirmed() -> Self {
        Self { _private: () }
    }

    /// Interpret an interactive answer; only `y`/`yes` confirm
    pub fn from_answer(answer: &str) -> Option<Self> {
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => Some(Self::affirmed()),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct KeyStore {
    storage: Arc<dyn KeyValueStorage>,
    namespace: String,
    keys: Vec<ApiKey>,
}

impl KeyStore {
    /// Load the collection from storage.
    ///
    /// Missing, unreadable or corrupt state yields an empty store; startup
    /// never fails on bad persisted data.
    pub async fn load(storage: Arc<dyn KeyValueStorage>, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();

        let keys = match storage.get(&namespace).await {
            Ok(Some(raw)) => match Self::from_json(&raw) {
                Ok(keys) => keys,
                Err(e) => {
                    warn!(
                        namespace = %namespace,
                        error = %e,
                        "Failed to load keys, starting empty"
                    );
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(
                    namespace = %namespace,
                    error = %e,
                    "Failed to read key storage, starting empty"
                );
                Vec::new()
            }
        };

        info!(namespace = %namespace, count = keys.len(), "Key store loaded");

        Self {
            storage,
            namespace,
            keys,
        }
    }

    /// Parse the persisted representation
    pub fn from_json(raw: &str) -> Result<Vec<ApiKey>, DomainError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Serialize a collection to the persisted representation
    pub fn to_json(keys: &[ApiKey]) -> Result<String, DomainError> {
        Ok(serde_json::to_string(keys)?)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// All keys, newest first
    pub fn records(&self) -> &[ApiKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Exact, case-sensitive token lookup. Tokens are not unique; the newest match wins.
    pub fn find_by_key(&self, token: &str) -> Option<&ApiKey> {
        self.keys.iter().find(|k| k.key() == token)
    }

    /// Case-insensitive substring search over token and note.
    ///
    /// An empty query returns every key. Store order is preserved.
    pub fn search(&self, query: &str) -> Vec<&ApiKey> {
        let needle = query.to_lowercase();
        self.keys
            .iter()
            .filter(|k| needle.is_empty() || k.matches_lowercase(&needle))
            .collect()
    }

    /// Prepend a batch, keeping its internal order, then persist
    pub async fn add_batch(&mut self, batch: Vec<ApiKey>) -> Result<usize, DomainError> {
        let added = batch.len();
        self.keys.splice(0..0, batch);

        info!(added, total = self.keys.len(), "Keys added");
        self.persist().await?;
        Ok(added)
    }

    /// Remove a key by id. Unknown ids are a no-op; state is persisted either way.
    pub async fn delete_one(&mut self, id: &ApiKeyId) -> Result<bool, DomainError> {
        let before = self.keys.len();
        self.keys.retain(|k| k.id() != id);
        let removed = self.keys.len() != before;

        if removed {
            info!(id = %id, "Key revoked");
        } else {
            debug!(id = %id, "Revoke requested for unknown key");
        }

        self.persist().await?;
        Ok(removed)
    }

    /// Remove every key and persist the empty collection
    pub async fn delete_all(
        &mut self,
        _confirmation: WipeConfirmation,
    ) -> Result<usize, DomainError> {
        let removed = self.keys.len();
        self.keys.clear();

        info!(removed, "All keys wiped");
        self.persist().await?;
        Ok(removed)
    }

    async fn persist(&self) -> Result<(), DomainError> {
        let raw = Self::to_json(&self.keys)?;
        self.storage.set(&self.namespace, &raw).await
    }
}
