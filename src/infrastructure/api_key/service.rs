//! API Key service
//!
//! Provides high-level operations for key management on top of the store,
//! the token generator and the validation simulator.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use tracing::info;

use crate::domain::api_key::{ApiKey, ApiKeyId, ExpirationState, GenerationRequest};
use crate::domain::{Clock, DomainError};

use super::export::write_export;
use super::generator::TokenGenerator;
use super::simulator::{ValidationResult, ValidationSimulator};
use super::store::{KeyStore, WipeConfirmation};

/// Key service for managing access keys
#[derive(Debug)]
pub struct KeyService {
    store: KeyStore,
    generator: TokenGenerator,
    simulator: ValidationSimulator,
    clock: Arc<dyn Clock>,
}

impl KeyService {
    /// Create a new key service over an already loaded store
    pub fn new(store: KeyStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            generator: TokenGenerator::new(),
            simulator: ValidationSimulator::new(clock.clone()),
            clock,
        }
    }

    /// Create with a custom simulated latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.simulator = ValidationSimulator::new(self.clock.clone()).with_latency(latency);
        self
    }

    pub fn store(&self) -> &KeyStore {
        &self.store
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Generate an unsaved batch
    pub fn preview(&self, request: &GenerationRequest) -> Vec<ApiKey> {
        let batch = self.generator.generate_batch(request, self.clock.now());
        info!(
            quantity = batch.len(),
            length = request.length(),
            duration_days = request.duration().days(),
            "Generated key preview"
        );
        batch
    }

    /// Merge a previewed batch into the store
    pub async fn save_batch(&mut self, batch: Vec<ApiKey>) -> Result<usize, DomainError> {
        self.store.add_batch(batch).await
    }

    /// Resolve an id or a unique id prefix to a stored key id
    pub fn resolve_id(&self, input: &str) -> Result<Option<ApiKeyId>, DomainError> {
        let input = input.trim();
        // the empty string prefixes every id
        if input.is_empty() {
            return Err(DomainError::validation("Key id cannot be empty"));
        }

        if let Some(key) = self.store.records().iter().find(|k| k.id().as_str() == input) {
            return Ok(Some(key.id().clone()));
        }

        let mut matches = self
            .store
            .records()
            .iter()
            .filter(|k| k.id().as_str().starts_with(input));

        match (matches.next(), matches.next()) {
            (Some(key), None) => Ok(Some(key.id().clone())),
            (Some(_), Some(_)) => Err(DomainError::validation(format!(
                "Id prefix '{}' matches more than one key",
                input
            ))),
            (None, _) => Ok(None),
        }
    }

    /// Revoke (delete) a key
    pub async fn revoke(&mut self, id: &ApiKeyId) -> Result<bool, DomainError> {
        info!("Revoking key: id={}", id);
        self.store.delete_one(id).await
    }

    /// Delete every key
    pub async fn wipe(&mut self, confirmation: WipeConfirmation) -> Result<usize, DomainError> {
        info!("Wiping all keys");
        self.store.delete_all(confirmation).await
    }

    pub fn search(&self, query: &str) -> Vec<&ApiKey> {
        self.store.search(query)
    }

    /// Lifecycle state of `key` right now
    pub fn status_of(&self, key: &ApiKey) -> ExpirationState {
        key.state(self.clock.now())
    }

    /// Simulated remote validation; `None` if superseded
    pub async fn validate(&self, token: &str) -> Option<ValidationResult> {
        self.simulator.validate(&self.store, token).await
    }

    pub fn cancel_validation(&self) {
        self.simulator.cancel();
    }

    pub fn is_validating(&self) -> bool {
        self.simulator.is_pending()
    }

    /// Export keys to a text file in `dir`, dates in the local time zone
    pub async fn export<'a>(
        &self,
        keys: impl IntoIterator<Item = &'a ApiKey>,
        dir: &Path,
    ) -> Result<PathBuf, DomainError> {
        write_export(dir, keys, self.clock.now(), &Local).await
    }
}
