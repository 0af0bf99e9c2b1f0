//! Payment identifiers and their source
//!
//! Payment ids are dense positive integers handed out by a [`PaymentIdSource`],
//! assigned to a payment exactly once before it is persisted. The newtype
//! keeps them from being mixed up with other integer values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::ports::PortError;

/// Identifier of a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(u32);

impl PaymentId {
    /// Wraps a raw id value
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id value
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PaymentId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<u32> for PaymentId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<PaymentId> for u32 {
    fn from(id: PaymentId) -> u32 {
        id.0
    }
}

/// Source of new payment identifiers
///
/// Implementations must hand out monotonic, unique ids. A permanently failing
/// implementation is used as a capability lock at call sites where minting a
/// new payment (e.g. a follow-up booking) is disallowed.
pub trait PaymentIdSource: Send + Sync {
    /// Returns the next free payment id
    fn next_id(&self) -> Result<PaymentId, PortError>;
}
