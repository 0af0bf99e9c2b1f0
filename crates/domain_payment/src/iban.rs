//! IBAN value object
//!
//! Structural validation only: character classes, length bounds and the
//! ISO 13616 mod-97 check. Bank metadata (BIC, bank name) for a validated
//! IBAN comes from the external enrichment port.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when validating an IBAN
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IbanError {
    #[error("IBAN has invalid length: {0}")]
    InvalidLength(usize),

    #[error("IBAN contains invalid character {0:?}")]
    InvalidCharacter(char),

    #[error("IBAN must start with a two-letter country code")]
    InvalidCountryCode,

    #[error("IBAN check digits do not match")]
    ChecksumMismatch,
}

/// A structurally validated IBAN, stored uppercased without separators
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iban(String);

impl Iban {
    /// Validates and normalises an IBAN
    ///
    /// Spaces are stripped and letters uppercased before validation.
    pub fn new(value: &str) -> Result<Self, IbanError> {
        let normalised: String = value
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if !(15..=34).contains(&normalised.len()) {
            return Err(IbanError::InvalidLength(normalised.len()));
        }
        if let Some(invalid) = normalised.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(IbanError::InvalidCharacter(invalid));
        }
        if !normalised
            .chars()
            .take(2)
            .all(|c| c.is_ascii_uppercase() && c.is_ascii_alphabetic())
        {
            return Err(IbanError::InvalidCountryCode);
        }
        if mod_97(&normalised) != 1 {
            return Err(IbanError::ChecksumMismatch);
        }

        Ok(Self(normalised))
    }

    /// Returns the IBAN as a string without separators
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the two-letter country code
    pub fn country_code(&self) -> &str {
        &self.0[..2]
    }
}

impl fmt::Display for Iban {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO 13616 checksum: rotate the first four characters to the end, expand
/// letters to two digits (A=10 .. Z=35), and reduce the number modulo 97.
fn mod_97(iban: &str) -> u32 {
    let rotated = format!("{}{}", &iban[4..], &iban[..4]);
    let mut remainder: u32 = 0;
    for c in rotated.chars() {
        if let Some(digit) = c.to_digit(10) {
            remainder = (remainder * 10 + digit) % 97;
        } else {
            let value = c as u32 - 'A' as u32 + 10;
            remainder = (remainder * 100 + value) % 97;
        }
    }
    remainder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_iban() {
        let iban = Iban::new("DE89370400440532013000").unwrap();
        assert_eq!(iban.as_str(), "DE89370400440532013000");
        assert_eq!(iban.country_code(), "DE");
    }

    #[test]
    fn test_normalisation_strips_spaces_and_uppercases() {
        let iban = Iban::new("de89 3704 0044 0532 0130 00").unwrap();
        assert_eq!(iban.as_str(), "DE89370400440532013000");
    }

    #[test]
    fn test_checksum_mismatch() {
        let result = Iban::new("DE89370400440532013001");
        assert_eq!(result, Err(IbanError::ChecksumMismatch));
    }

    #[test]
    fn test_length_bounds() {
        assert_eq!(Iban::new("DE8937"), Err(IbanError::InvalidLength(6)));
        let too_long = format!("DE89{}", "0".repeat(40));
        assert_eq!(Iban::new(&too_long), Err(IbanError::InvalidLength(44)));
    }

    #[test]
    fn test_invalid_characters_and_country() {
        assert_eq!(
            Iban::new("DE89-3704-0044-0532-0130-00"),
            Err(IbanError::InvalidCharacter('-'))
        );
        assert_eq!(
            Iban::new("8989370400440532013000"),
            Err(IbanError::InvalidCountryCode)
        );
    }
}
