//! Token generation
//!
//! Tokens are display identifiers, not secrets: characters are drawn with a
//! non-cryptographic RNG and collisions are not checked.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::domain::api_key::{ApiKey, ApiKeyId, GenerationRequest};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generator for access tokens
#[derive(Debug, Clone, Default)]
pub struct TokenGenerator;

impl TokenGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate a token of `length` characters from `[a-zA-Z0-9]`
    pub fn generate(&self, length: usize) -> String {
        self.generate_with(&mut rand::thread_rng(), length)
    }

    /// Generate a token using the supplied RNG.
    ///
    /// Each character is drawn uniformly from `a-z0-9`; letters are then
    /// uppercased on an independent coin flip. Digits are never altered.
    pub fn generate_with<R: Rng>(&self, rng: &mut R, length: usize) -> String {
        let mut token = String::with_capacity(length);

        for _ in 0..length {
            let ch = char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]);

            if ch.is_ascii_alphabetic() && rng.gen_bool(0.5) {
                token.push(ch.to_ascii_uppercase());
            } else {
                token.push(ch);
            }
        }

        token
    }

    /// Build an unsaved batch for `request`, all stamped with `now`
    pub fn generate_batch(&self, request: &GenerationRequest, now: DateTime<Utc>) -> Vec<ApiKey> {
        self.generate_batch_with(&mut rand::thread_rng(), request, now)
    }

    pub fn generate_batch_with<R: Rng>(
        &self,
        rng: &mut R,
        request: &GenerationRequest,
        now: DateTime<Utc>,
    ) -> Vec<ApiKey> {
        let expires_at = request.duration().expiry_from(now);

        (0..request.quantity())
            .map(|_| {
                ApiKey::new(
                    ApiKeyId::generate(),
                    self.generate_with(&mut *rng, request.length()),
                    request.note(),
                    now,
                    expires_at,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::KeyDuration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_generate_length_and_charset() {
        let generator = TokenGenerator::new();

        for length in [0, 1, 10, 15, 64, 200] {
            let token = generator.generate(length);
            assert_eq!(token.chars().count(), length);
            assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_zero_length_is_empty() {
        assert_eq!(TokenGenerator::new().generate(0), "");
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let generator = TokenGenerator::new();
        let a = generator.generate_with(&mut StdRng::seed_from_u64(7), 32);
        let b = generator.generate_with(&mut StdRng::seed_from_u64(7), 32);

        assert_eq!(a, b);
    }

    #[test]
    fn test_both_cases_and_digits_appear() {
        let generator = TokenGenerator::new();
        let token = generator.generate_with(&mut StdRng::seed_from_u64(42), 2_000);

        assert!(token.chars().any(|c| c.is_ascii_uppercase()));
        assert!(token.chars().any(|c| c.is_ascii_lowercase()));
        assert!(token.chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_batch() {
        let generator = TokenGenerator::new();
        let now = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let request = GenerationRequest::default()
            .with_length(15)
            .with_quantity(3)
            .with_note("Premium User")
            .with_duration(KeyDuration::SevenDays);

        let batch = generator.generate_batch(&request, now);

        assert_eq!(batch.len(), 3);
        let ids: HashSet<_> = batch.iter().map(|k| k.id().clone()).collect();
        assert_eq!(ids.len(), 3);

        for key in &batch {
            assert_eq!(key.key().len(), 15);
            assert_eq!(key.note(), "Premium User");
            assert_eq!(key.created_at(), now);
            assert_eq!(
                key.expires_at().map(|t| t.timestamp_millis()),
                Some(1_700_000_000_000 + 7 * 86_400_000)
            );
        }
    }

    #[test]
    fn test_generate_lifetime_batch() {
        let generator = TokenGenerator::new();
        let now = Utc::now();
        let request = GenerationRequest::default().with_duration(KeyDuration::Lifetime);

        let batch = generator.generate_batch(&request, now);

        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].expires_at(), None);
    }
}
