//! Storage factory for runtime storage selection

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::storage::KeyValueStorage;
use crate::domain::DomainError;

use super::file::FileStorage;
use super::in_memory::InMemoryStorage;

/// Supported storage types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/throwaway sessions)
    InMemory,
    /// JSON files in a local directory
    File,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "file" | "fs" | "local" => Some(Self::File),
            _ => None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// In-memory storage configuration
    InMemory,
    /// File storage rooted at a directory
    File(PathBuf),
}

impl StorageConfig {
    /// Creates an in-memory storage configuration
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Creates a file storage configuration
    pub fn file(root: impl Into<PathBuf>) -> Self {
        Self::File(root.into())
    }

    /// Builds a configuration from a backend name and a directory
    pub fn from_backend(backend: &str, root: impl Into<PathBuf>) -> Result<Self, DomainError> {
        match StorageType::from_str(backend) {
            Some(StorageType::InMemory) => Ok(Self::InMemory),
            Some(StorageType::File) => Ok(Self::File(root.into())),
            None => Err(DomainError::configuration(format!(
                "Unknown storage backend '{}'",
                backend
            ))),
        }
    }
}

/// Factory for creating storage instances
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates a storage instance based on the configuration
    pub fn create(config: &StorageConfig) -> Arc<dyn KeyValueStorage> {
        match config {
            StorageConfig::InMemory => Arc::new(InMemoryStorage::new()),
            StorageConfig::File(root) => Arc::new(FileStorage::new(root.clone())),
        }
    }
}
