//! Hash-based ID generation for task and dependency records.
//!
//! Creates collision-resistant short IDs using SHA-256 and base36
//! encoding, with adaptive length that grows with database size.
//! Format: `{prefix}-{hash}` (e.g., "task-a3f8", "dep-k09x2").

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;
const MAX_ID_LENGTH: usize = 6;

/// Errors that can occur during ID generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// Unable to generate a unique ID after exhausting all nonces and
    /// length increases
    #[error("Unable to generate unique ID after {attempts} attempts")]
    CollisionExhausted {
        /// How many candidate IDs were tried
        attempts: u32,
    },
}

/// Configuration for ID generation
#[derive(Debug, Clone)]
pub struct IdGeneratorConfig {
    /// Prefix for all IDs (e.g., "task", "dep")
    pub prefix: String,

    /// Current size of the database (affects adaptive length)
    pub database_size: usize,
}

/// Hash-based ID generator with collision detection.
///
/// The generator tracks every ID it has produced or been told about via
/// [`register_id`](Self::register_id), so collisions against existing
/// records are impossible within one generator instance.
pub struct IdGenerator {
    config: IdGeneratorConfig,
    existing_ids: HashSet<String>,
}

impl IdGenerator {
    /// Create a new ID generator with the given configuration
    #[must_use]
    pub fn new(config: IdGeneratorConfig) -> Self {
        Self {
            config,
            existing_ids: HashSet::new(),
        }
    }

    /// Register an existing ID to prevent collisions
    pub fn register_id(&mut self, id: String) {
        self.existing_ids.insert(id);
    }

    /// Returns the database size the generator was configured with
    #[must_use]
    pub fn database_size(&self) -> usize {
        self.config.database_size
    }

    /// Generate a new unique ID from the given seed material.
    ///
    /// The seed is combined with the current timestamp and a retry nonce
    /// before hashing, so identical seeds still produce distinct IDs.
    ///
    /// # Errors
    ///
    /// Returns an error if no unique ID could be produced after trying
    /// all nonces at every allowed length.
    pub fn generate(&mut self, seed: &str) -> Result<String, IdGenerationError> {
        let mut length = self.adaptive_length();
        let mut attempts = 0u32;

        loop {
            for nonce in 0..MAX_NONCE {
                attempts += 1;
                let id = self.hash_id(seed, nonce, length);
                if !self.existing_ids.contains(&id) {
                    if nonce > 0 {
                        debug!(nonce, length, "generated unique ID after collision retries");
                    }
                    self.existing_ids.insert(id.clone());
                    return Ok(id);
                }
            }

            if length < MAX_ID_LENGTH {
                warn!(
                    length,
                    "all nonces collided, retrying with increased ID length"
                );
                length += 1;
            } else {
                return Err(IdGenerationError::CollisionExhausted { attempts });
            }
        }
    }

    /// ID length grows with database size: 4 chars up to 500 records,
    /// 5 up to 1500, 6 beyond.
    fn adaptive_length(&self) -> usize {
        match self.config.database_size {
            0..=500 => 4,
            501..=1500 => 5,
            _ => 6,
        }
    }

    fn hash_id(&self, seed: &str, nonce: u32, length: usize) -> String {
        let mut hasher = Sha256::new();
        hasher.update(seed.as_bytes());
        hasher.update(Utc::now().timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
        hasher.update(nonce.to_le_bytes());
        let digest = hasher.finalize();

        let hash: String = digest
            .iter()
            .take(length)
            .map(|byte| BASE36_CHARS[usize::from(*byte) % BASE36_CHARS.len()] as char)
            .collect();

        format!("{}-{}", self.config.prefix, hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(prefix: &str, size: usize) -> IdGenerator {
        IdGenerator::new(IdGeneratorConfig {
            prefix: prefix.to_string(),
            database_size: size,
        })
    }

    #[test]
    fn generated_ids_carry_prefix() {
        let mut idgen = generator("dep", 0);
        let id = idgen.generate("task-1|task-2|alice").unwrap();
        assert!(id.starts_with("dep-"));
    }

    #[test]
    fn small_database_uses_short_ids() {
        let mut idgen = generator("task", 10);
        let id = idgen.generate("some seed").unwrap();
        // "task-" plus 4 hash chars
        assert_eq!(id.len(), 9);
    }

    #[test]
    fn large_database_uses_longer_ids() {
        let mut idgen = generator("task", 2000);
        let id = idgen.generate("some seed").unwrap();
        assert_eq!(id.len(), 11);
    }

    #[test]
    fn identical_seeds_produce_distinct_ids() {
        let mut idgen = generator("dep", 0);
        let first = idgen.generate("same seed").unwrap();
        let second = idgen.generate("same seed").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn registered_ids_are_never_reissued() {
        let mut idgen = generator("dep", 0);
        let id = idgen.generate("seed").unwrap();

        let mut fresh = generator("dep", 0);
        fresh.register_id(id.clone());
        for _ in 0..50 {
            assert_ne!(fresh.generate("seed").unwrap(), id);
        }
    }

    #[test]
    fn ids_are_base36_lowercase() {
        let mut idgen = generator("dep", 0);
        for _ in 0..20 {
            let id = idgen.generate("seed").unwrap();
            let hash = id.strip_prefix("dep-").unwrap();
            assert!(hash
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }
}
