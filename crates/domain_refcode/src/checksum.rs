//! Checksum strategies for reference codes
//!
//! The checksum is one character appended to the formatted code. Same input,
//! same checksum, always; the concrete weighting is a pluggable strategy.

use crate::code::{alphabet_index, CODE_ALPHABET};
use crate::error::RefCodeError;

/// Computes the checksum character for a prefix+code payload
///
/// Implementations must be deterministic and always return a character from
/// [`CODE_ALPHABET`].
pub trait ChecksumGenerator: Send + Sync {
    fn checksum_character(&self, payload: &str) -> Result<char, RefCodeError>;
}

/// Position-weighted checksum over the code alphabet
///
/// Each character contributes its alphabet position multiplied by a weight
/// that grows with its position in the payload, summed modulo the alphabet
/// size. The alphabet size is prime and the payload (prefix + code, 8
/// characters) is shorter than it, so no weight vanishes modulo 19:
/// every single-character substitution and every adjacent transposition of
/// two distinct characters changes the checksum.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedChecksum;

impl ChecksumGenerator for WeightedChecksum {
    fn checksum_character(&self, payload: &str) -> Result<char, RefCodeError> {
        let modulus = CODE_ALPHABET.len();
        let mut sum = 0usize;
        for (position, character) in payload.chars().enumerate() {
            let index = alphabet_index(character).ok_or_else(|| {
                RefCodeError::InvalidCode(format!(
                    "checksum payload contains {:?}, not in the code alphabet",
                    character
                ))
            })?;
            sum = (sum + (position + 1) * index) % modulus;
        }
        // sum < modulus, so the lookup cannot fail
        CODE_ALPHABET.chars().nth(sum).ok_or_else(|| {
            RefCodeError::InvalidCode(format!("checksum index {} out of range", sum))
        })
    }
}
