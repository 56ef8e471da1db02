//! # Identifiers
//!
//! Short, human-readable ids: a one-letter tag, an underscore, and five
//! characters from `A-Z0-9` (`B_7QK2M`, `M_X0A9C`). The space is 36^5, so
//! collisions are rare but possible; `generate_unique` re-rolls until the
//! candidate is free in the target collection.

use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::error::LibraryError;

/// Number of random characters after the underscore.
pub const ID_BODY_LEN: usize = 5;

/// Draws allowed before `generate_unique` gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 64;

const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPrefix {
    Book,
    Member,
}

impl IdPrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            IdPrefix::Book => "B",
            IdPrefix::Member => "M",
        }
    }
}

#[derive(Debug)]
pub struct IdentifierGenerator {
    rng: StdRng,
    max_attempts: u32,
}

impl Default for IdentifierGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierGenerator {
    /// Generator seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic generator, for tests and reproducible fixtures.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// One draw, no uniqueness check.
    pub fn generate(&mut self, prefix: IdPrefix) -> String {
        let mut id = String::with_capacity(2 + ID_BODY_LEN);
        id.push_str(prefix.as_str());
        id.push('_');
        for _ in 0..ID_BODY_LEN {
            let idx = self.rng.random_range(0..ID_ALPHABET.len());
            id.push(char::from(ID_ALPHABET[idx]));
        }
        id
    }

    /// Draws until `taken` rejects the candidate, at most `max_attempts` times.
    pub fn generate_unique<F>(&mut self, prefix: IdPrefix, taken: F) -> Result<String, LibraryError>
    where
        F: Fn(&str) -> bool,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = self.generate(prefix);
            if !taken(&candidate) {
                return Ok(candidate);
            }
            warn!("Identifier collision on {} (attempt {})", candidate, attempt);
        }
        Err(LibraryError::IdSpaceExhausted {
            prefix: prefix.as_str(),
            attempts: self.max_attempts,
        })
    }
}

/// Checks `id` against `<prefix>_[A-Z0-9]{5}`.
pub fn is_well_formed(id: &str, prefix: IdPrefix) -> bool {
    let Some(body) = id
        .strip_prefix(prefix.as_str())
        .and_then(|rest| rest.strip_prefix('_'))
    else {
        return false;
    };
    body.len() == ID_BODY_LEN && body.bytes().all(|b| ID_ALPHABET.contains(&b))
}
