//! Euro amounts with integer-cent precision
//!
//! Payment amounts are stored as whole euro cents. Construction fails closed:
//! negative or sub-cent inputs are rejected, so every `Euro` in the system is
//! a valid non-negative amount. `rust_decimal` is used only at the display
//! boundary.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when constructing or combining amounts
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A non-negative euro amount in cents
///
/// The inner value is private; use [`Euro::from_cents`] or [`Euro::from_euros`]
/// so the non-negativity invariant always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Euro(i64);

impl Euro {
    /// Creates an amount from euro cents, rejecting negative values
    pub fn from_cents(cents: i64) -> Result<Self, MoneyError> {
        if cents < 0 {
            return Err(MoneyError::InvalidAmount(format!(
                "amount must not be negative, got {} cents",
                cents
            )));
        }
        Ok(Self(cents))
    }

    /// Creates an amount from a decimal euro value
    ///
    /// Rejects negative values and values with more than two decimal places.
    pub fn from_euros(euros: Decimal) -> Result<Self, MoneyError> {
        let cents = euros * Decimal::new(100, 0);
        if cents.fract() != Decimal::ZERO {
            return Err(MoneyError::InvalidAmount(format!(
                "amount {} has sub-cent precision",
                euros
            )));
        }
        let cents = cents.to_i64().ok_or(MoneyError::Overflow)?;
        Self::from_cents(cents)
    }

    /// Returns the zero amount
    pub fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in euro cents
    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the amount as a decimal euro value
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Adds two amounts, failing on overflow
    pub fn checked_add(&self, other: Euro) -> Result<Euro, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Euro)
            .ok_or(MoneyError::Overflow)
    }
}

impl fmt::Display for Euro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}
