//! Storage trait definition

use std::fmt::Debug;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::DomainError;

/// Durable key-value storage holding one text blob per named entry
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KeyValueStorage: Send + Sync + Debug {
    /// Reads an entry, `None` if it was never written
    async fn get(&self, name: &str) -> Result<Option<String>, DomainError>;

    /// Replaces an entry with `value`
    async fn set(&self, name: &str, value: &str) -> Result<(), DomainError>;
}
