//! Validation simulator
//!
//! Answers "would this token be accepted?" against the local store after an
//! artificial round-trip delay. Only the most recent request may deliver a
//! result: starting a new validation or calling [`ValidationSimulator::cancel`]
//! supersedes whatever is in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::api_key::{ApiKey, ExpirationState};
use crate::domain::Clock;

use super::store::KeyStore;

pub const DEFAULT_LATENCY: Duration = Duration::from_millis(800);

/// Outcome of validating a candidate token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// No stored key has this token
    Invalid,
    /// Stored and not expired
    Valid(ApiKey),
    /// Stored but past its expiry
    Expired(ApiKey),
}

impl ValidationResult {
    /// Classify `candidate` against `store` at `now`
    pub fn lookup(store: &KeyStore, candidate: &str, now: DateTime<Utc>) -> Self {
        match store.find_by_key(candidate) {
            None => Self::Invalid,
            Some(key) if key.state(now) == ExpirationState::Expired => Self::Expired(key.clone()),
            Some(key) => Self::Valid(key.clone()),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

#[derive(Debug)]
pub struct ValidationSimulator {
    latency: Duration,
    clock: Arc<dyn Clock>,
    generation: AtomicU64,
    pending: AtomicU64,
}

impl ValidationSimulator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            latency: DEFAULT_LATENCY,
            clock,
            generation: AtomicU64::new(0),
            pending: AtomicU64::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Whether a validation is currently waiting out its delay
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst) != 0
    }

    /// Invalidate any in-flight validation, e.g. because the input changed
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.pending.store(0, Ordering::SeqCst);
    }

    /// Validate `candidate` after the simulated latency.
    ///
    /// Returns `None` when this request was superseded before the delay
    /// elapsed. `now` is read after the delay.
    pub async fn validate(&self, store: &KeyStore, candidate: &str) -> Option<ValidationResult> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _pending = PendingGuard::start(&self.pending, ticket);

        debug!(ticket, "Validation started");
        tokio::time::sleep(self.latency).await;

        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "Validation superseded, dropping result");
            return None;
        }

        let result = ValidationResult::lookup(store, candidate, self.clock.now());
        debug!(ticket, valid = result.is_valid(), "Validation finished");
        Some(result)
    }
}

/// Marks a ticket as in flight until dropped, including when the future is dropped mid-delay
struct PendingGuard<'a> {
    pending: &'a AtomicU64,
    ticket: u64,
}

impl<'a> PendingGuard<'a> {
    fn start(pending: &'a AtomicU64, ticket: u64) -> Self {
        pending.store(ticket, Ordering::SeqCst);
        Self { pending, ticket }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let _ = self
            .pending
            .compare_exchange(self.ticket, 0, Ordering::SeqCst, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::ApiKeyId;
    use crate::domain::FixedClock;
    use crate::infrastructure::api_key::store::DEFAULT_NAMESPACE;
    use crate::infrastructure::storage::InMemoryStorage;

    const T: i64 = 1_700_000_000_000;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    async fn store_with(keys: Vec<ApiKey>) -> KeyStore {
        let mut store = KeyStore::load(Arc::new(InMemoryStorage::new()), DEFAULT_NAMESPACE).await;
        store.add_batch(keys).await.unwrap();
        store
    }

    fn simulator() -> (Arc<FixedClock>, ValidationSimulator) {
        let clock = Arc::new(FixedClock::new(at(T)));
        let simulator = ValidationSimulator::new(clock.clone());
        (clock, simulator)
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_store_is_invalid() {
        let (_, simulator) = simulator();
        let store = store_with(vec![]).await;

        let result = simulator.validate(&store, "anything").await;
        assert_eq!(result, Some(ValidationResult::Invalid));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_key() {
        let (_, simulator) = simulator();
        let key = ApiKey::new(
            ApiKeyId::generate(),
            "ABC123",
            "",
            at(T - 10_000),
            Some(at(T - 1_000)),
        );
        let store = store_with(vec![key.clone()]).await;

        let result = simulator.validate(&store, "ABC123").await;
        assert_eq!(result, Some(ValidationResult::Expired(key)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_valid_and_lifetime_keys() {
        let (_, simulator) = simulator();
        let active = ApiKey::new(ApiKeyId::generate(), "ACTIVE0001", "", at(T), Some(at(T)));
        let lifetime = ApiKey::new(ApiKeyId::generate(), "FOREVER001", "", at(T), None);
        let store = store_with(vec![active.clone(), lifetime.clone()]).await;

        assert_eq!(
            simulator.validate(&store, "ACTIVE0001").await,
            Some(ValidationResult::Valid(active))
        );
        assert_eq!(
            simulator.validate(&store, "FOREVER001").await,
            Some(ValidationResult::Valid(lifetime))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_is_case_sensitive() {
        let (_, simulator) = simulator();
        let key = ApiKey::new(ApiKeyId::generate(), "ABC123", "", at(T), None);
        let store = store_with(vec![key]).await;

        assert_eq!(
            simulator.validate(&store, "abc123").await,
            Some(ValidationResult::Invalid)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_read_after_delay() {
        let (clock, simulator) = simulator();
        let key = ApiKey::new(ApiKeyId::generate(), "EDGE000001", "", at(T), Some(at(T)));
        let store = store_with(vec![key.clone()]).await;

        let (result, _) = tokio::join!(simulator.validate(&store, "EDGE000001"), async {
            clock.set(at(T + 1));
        });

        assert_eq!(result, Some(ValidationResult::Expired(key)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_latency() {
        let (_, simulator) = simulator();
        let store = store_with(vec![]).await;
        let started = tokio::time::Instant::now();

        simulator.validate(&store, "x").await;

        assert!(started.elapsed() >= DEFAULT_LATENCY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_request_supersedes_older() {
        let (_, simulator) = simulator();
        let key = ApiKey::new(ApiKeyId::generate(), "SECOND0001", "", at(T), None);
        let store = store_with(vec![key.clone()]).await;

        let (first, second) = tokio::join!(
            simulator.validate(&store, "FIRST00001"),
            simulator.validate(&store, "SECOND0001")
        );

        assert_eq!(first, None);
        assert_eq!(second, Some(ValidationResult::Valid(key)));
        assert!(!simulator.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_result() {
        let (_, simulator) = simulator();
        let store = store_with(vec![]).await;

        let (result, was_pending) = tokio::join!(simulator.validate(&store, "x"), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let was_pending = simulator.is_pending();
            simulator.cancel();
            was_pending
        });

        assert!(was_pending);
        assert_eq!(result, None);
        assert!(!simulator.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_future_clears_pending() {
        let (_, simulator) = simulator();
        let store = store_with(vec![]).await;

        let outcome = tokio::time::timeout(
            Duration::from_millis(100),
            simulator.validate(&store, "x"),
        )
        .await;

        assert!(outcome.is_err());
        assert!(!simulator.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_latency() {
        let (_, simulator) = simulator();
        let simulator = simulator.with_latency(Duration::from_millis(5));
        let store = store_with(vec![]).await;

        let outcome = tokio::time::timeout(
            Duration::from_millis(10),
            simulator.validate(&store, "x"),
        )
        .await;

        assert_eq!(outcome.unwrap(), Some(ValidationResult::Invalid));
    }
}
