//! Reference code generation
//!
//! The generator draws code characters through a [`CharacterIndexSource`], so
//! production code uses real randomness while tests inject a deterministic
//! sequence and get reproducible codes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::checksum::{ChecksumGenerator, WeightedChecksum};
use crate::code::{validate_prefix, ReferenceCode, CODE_ALPHABET, CODE_LENGTH};
use crate::error::RefCodeError;

/// Source of character indices for code generation
///
/// `next_index(max)` returns a value in `[0, max]` inclusive.
pub trait CharacterIndexSource: Send {
    fn next_index(&mut self, max: usize) -> usize;
}

/// Cryptographically seeded random index source for production use
pub struct RandomIndexSource {
    rng: StdRng,
}

impl RandomIndexSource {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for RandomIndexSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterIndexSource for RandomIndexSource {
    fn next_index(&mut self, max: usize) -> usize {
        self.rng.gen_range(0..=max)
    }
}

/// Deterministic index source that walks the alphabet in order
///
/// Ignores `max` bounds only in the sense that it wraps around; with a fresh
/// instance, generated codes are fully reproducible.
#[derive(Debug, Default)]
pub struct SequentialIndexSource {
    next: usize,
}

impl SequentialIndexSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CharacterIndexSource for SequentialIndexSource {
    fn next_index(&mut self, max: usize) -> usize {
        let index = self.next % (max + 1);
        self.next += 1;
        index
    }
}

/// Produces reference codes from a prefix and an index source
///
/// No I/O; uniqueness against persisted codes is the job of
/// [`crate::unique::UniqueReferenceCodeGenerator`].
pub struct ReferenceCodeGenerator {
    index_source: Box<dyn CharacterIndexSource>,
    checksum: Box<dyn ChecksumGenerator>,
}

impl ReferenceCodeGenerator {
    /// Creates a generator with the default checksum strategy
    pub fn new(index_source: Box<dyn CharacterIndexSource>) -> Self {
        Self {
            index_source,
            checksum: Box::new(WeightedChecksum),
        }
    }

    /// Replaces the checksum strategy
    pub fn with_checksum(mut self, checksum: Box<dyn ChecksumGenerator>) -> Self {
        self.checksum = checksum;
        self
    }

    /// Generates a new reference code for the given two-character prefix
    pub fn new_payment_reference(&mut self, prefix: &str) -> Result<ReferenceCode, RefCodeError> {
        validate_prefix(prefix)?;

        let alphabet: Vec<char> = CODE_ALPHABET.chars().collect();
        let code: String = (0..CODE_LENGTH)
            .map(|_| alphabet[self.index_source.next_index(alphabet.len() - 1)])
            .collect();

        let checksum = self
            .checksum
            .checksum_character(&format!("{}{}", prefix, code))?;

        Ok(ReferenceCode::assemble(prefix.to_string(), code, checksum))
    }
}
