//! In-memory storage implementation

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::storage::KeyValueStorage;
use crate::domain::DomainError;

/// Thread-safe in-memory storage implementation
///
/// Useful for testing and throwaway sessions. Data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStorage {
    /// Creates a new empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage pre-populated with one entry
    pub fn with_entry(name: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::new();
        storage
            .entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.into(), value.into());
        storage
    }
}

#[async_trait]
impl KeyValueStorage for InMemoryStorage {
    async fn get(&self, name: &str) -> Result<Option<String>, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(entries.get(name).cloned())
    }

    async fn set(&self, name: &str, value: &str) -> Result<(), DomainError> {
        let mut entries = self.entries.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        entries.insert(name.to_string(), value.to_string());
        Ok(())
    }
}
