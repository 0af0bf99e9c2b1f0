//! Reference Code Domain - transfer codes for manual payment workflows
//!
//! Bank-transfer and Sofort payments are matched to incoming money by a
//! human-transcribable reference code: a caller-supplied two-character prefix,
//! six random characters from a restricted alphabet, and one checksum
//! character, dash-grouped as `PP-XXX-XXX-C`.
//!
//! The alphabet excludes visually ambiguous characters so the code survives
//! being read from a bank statement and re-typed. The checksum detects the
//! two common transcription mistakes: replacing a single character and
//! swapping two adjacent ones.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut generator = UniqueReferenceCodeGenerator::new(
//!     ReferenceCodeGenerator::new(Box::new(RandomIndexSource::new())),
//!     store.clone(),
//! );
//! let code = generator.new_payment_reference("XW").await?;
//! println!("{}", code.formatted()); // e.g. "XW-RTZ-E49-F"
//! ```

pub mod checksum;
pub mod code;
pub mod error;
pub mod generator;
pub mod unique;

pub use checksum::{ChecksumGenerator, WeightedChecksum};
pub use code::{ReferenceCode, CODE_ALPHABET, CODE_LENGTH, PREFIX_LENGTH};
pub use error::RefCodeError;
pub use generator::{CharacterIndexSource, RandomIndexSource, ReferenceCodeGenerator, SequentialIndexSource};
pub use unique::{CodeExistence, UniqueReferenceCodeGenerator};
