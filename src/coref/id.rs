//! Group identifier generation.
//!
//! Identifiers are short strings over `[a-z0-9]`. Collisions between unrelated
//! groups are possible; see `CorefConfig::check_id_collisions`.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

/// Alphabet for random identifiers.
pub const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Source of new group identifiers.
///
/// Generated identifiers are stored as atoms, so they must not contain
/// whitespace or parentheses.
pub trait CorefIdGenerator: Send + Sync {
    /// Produces a new identifier of (nominally) `len` characters.
    fn generate(&self, len: usize) -> String;
}

/// Draws each character independently from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl RandomIdGenerator {
    /// Creates a generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CorefIdGenerator for RandomIdGenerator {
    fn generate(&self, len: usize) -> String {
        let mut rng = rand::thread_rng();
        (0..len)
            .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
            .collect()
    }
}

/// Deterministic generator: `prefix` followed by a zero-padded counter.
///
/// The counter starts at 1. Once it no longer fits in `len - prefix.len()`
/// digits the identifier grows past `len`.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Creates a generator with the given prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("g")
    }
}

impl CorefIdGenerator for SequentialIdGenerator {
    fn generate(&self, len: usize) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        let width = len.saturating_sub(self.prefix.len());
        format!("{}{n:0width$}", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_use_alphabet_and_length() {
        let ids = RandomIdGenerator::new();
        for len in [1, 7, 32] {
            let id = ids.generate(len);
            assert_eq!(id.len(), len);
            assert!(id.bytes().all(|b| ID_ALPHABET.contains(&b)));
        }
        assert!(ids.generate(0).is_empty());
    }

    #[test]
    fn random_ids_differ_between_calls() {
        let ids = RandomIdGenerator::new();
        // 36^16 possibilities; a repeat here means the RNG is broken.
        assert_ne!(ids.generate(16), ids.generate(16));
    }

    #[test]
    fn sequential_ids_are_padded_and_increasing() {
        let ids = SequentialIdGenerator::new("g");
        assert_eq!(ids.generate(7), "g000001");
        assert_eq!(ids.generate(7), "g000002");
        assert_eq!(ids.generate(3), "g03");
        assert_eq!(ids.generate(0), "g4");
    }
}
