//! The reference code value object

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::checksum::{ChecksumGenerator, WeightedChecksum};
use crate::error::RefCodeError;

/// Characters a reference code may contain
///
/// Visually ambiguous characters (0/O, 1/I, 2/Z-lookalikes, 5/S, 8/B, ...)
/// are excluded so codes survive manual transcription. The length of 19 is
/// prime, which the checksum relies on.
pub const CODE_ALPHABET: &str = "ACDEFKLMNPRTWXYZ349";

/// Number of randomly drawn characters in a code
pub const CODE_LENGTH: usize = 6;

/// Number of caller-supplied prefix characters
pub const PREFIX_LENGTH: usize = 2;

/// Returns the position of a character in the code alphabet
pub(crate) fn alphabet_index(c: char) -> Option<usize> {
    CODE_ALPHABET.chars().position(|a| a == c)
}

/// A human-transcribable payment reference code
///
/// Consists of a two-character prefix identifying the payment type or
/// campaign, six random code characters, and one checksum character. The
/// formatted form `PP-XXX-XXX-C` is what donors copy into their bank
/// transfer; it must be unique across all code-bearing payments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceCode {
    prefix: String,
    code: String,
    checksum: char,
}

impl ReferenceCode {
    pub(crate) fn assemble(prefix: String, code: String, checksum: char) -> Self {
        Self {
            prefix,
            code,
            checksum,
        }
    }

    /// Returns the two-character prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the six random code characters
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the checksum character
    pub fn checksum(&self) -> char {
        self.checksum
    }

    /// Returns the dash-grouped form, e.g. `"XW-ACD-EFK-K"`
    pub fn formatted(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.prefix,
            &self.code[..3],
            &self.code[3..],
            self.checksum
        )
    }

    /// Parses a formatted code, validating it with the default checksum
    pub fn parse(formatted: &str) -> Result<Self, RefCodeError> {
        Self::parse_with(formatted, &WeightedChecksum)
    }

    /// Parses a formatted code, validating it with the given checksum strategy
    pub fn parse_with(
        formatted: &str,
        checksum_generator: &dyn ChecksumGenerator,
    ) -> Result<Self, RefCodeError> {
        let segments: Vec<&str> = formatted.split('-').collect();
        let [prefix, first, second, check] = segments[..] else {
            return Err(RefCodeError::InvalidCode(format!(
                "expected 4 dash-separated groups in {:?}",
                formatted
            )));
        };
        if first.len() != 3 || second.len() != 3 || check.len() != 1 {
            return Err(RefCodeError::InvalidCode(format!(
                "malformed groups in {:?}",
                formatted
            )));
        }
        validate_prefix(prefix)?;

        let code = format!("{}{}", first, second);
        if code.chars().any(|c| alphabet_index(c).is_none()) {
            return Err(RefCodeError::InvalidCode(format!(
                "{:?} contains characters outside the code alphabet",
                formatted
            )));
        }

        let payload = format!("{}{}", prefix, code);
        let expected = checksum_generator.checksum_character(&payload)?;
        let actual = check.chars().next().unwrap_or_default();
        if actual != expected {
            return Err(RefCodeError::InvalidCode(format!(
                "checksum mismatch in {:?}",
                formatted
            )));
        }

        Ok(Self::assemble(prefix.to_string(), code, expected))
    }
}

impl fmt::Display for ReferenceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

/// Checks that a prefix is exactly two characters from the code alphabet
pub fn validate_prefix(prefix: &str) -> Result<(), RefCodeError> {
    if prefix.chars().count() != PREFIX_LENGTH
        || prefix.chars().any(|c| alphabet_index(c).is_none())
    {
        return Err(RefCodeError::InvalidPrefix(format!(
            "prefix must be {} characters from {:?}, got {:?}",
            PREFIX_LENGTH, CODE_ALPHABET, prefix
        )));
    }
    Ok(())
}
