//! Reference code domain errors

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur in the reference code domain
#[derive(Debug, Error)]
pub enum RefCodeError {
    /// The caller-supplied prefix is not two characters from the code alphabet
    #[error("Invalid prefix: {0}")]
    InvalidPrefix(String),

    /// A formatted code could not be parsed or failed its checksum
    #[error("Invalid reference code: {0}")]
    InvalidCode(String),

    /// The uniqueness retry ceiling was hit without finding a free code
    #[error("Reference code generation exhausted after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },

    /// The code existence lookup failed
    #[error("Code lookup failed: {0}")]
    Lookup(#[from] PortError),
}
