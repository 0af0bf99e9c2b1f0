//! Payment domain errors
//!
//! `InvalidAmount`, `VerificationFailed`, `InvalidStateTransition` and
//! `InvalidBookingData` are recoverable business outcomes a caller is
//! expected to handle. `NotFound` is recoverable on the mutation paths;
//! on the read-side projection it indicates a caller bug and surfaces as a
//! port error instead.

use core_kernel::{PaymentId, PortError};
use thiserror::Error;

use crate::iban::IbanError;
use domain_refcode::RefCodeError;

/// Errors that can occur in the payment domain
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Non-positive or unparsable amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The external verifier rejected the transaction
    #[error("Payment verification failed: {0}")]
    VerificationFailed(String),

    /// A lifecycle guard was violated
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// No payment exists for the given id
    #[error("Payment not found: {0}")]
    NotFound(PaymentId),

    /// Provider booking data is missing required fields
    #[error("Invalid booking data: {0}")]
    InvalidBookingData(String),

    /// The supplied IBAN is structurally invalid
    #[error(transparent)]
    Iban(#[from] IbanError),

    /// Reference code generation failed
    #[error(transparent)]
    ReferenceCode(#[from] RefCodeError),

    /// An adapter operation failed
    #[error(transparent)]
    Port(#[from] PortError),
}

impl PaymentError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        PaymentError::InvalidStateTransition(message.into())
    }

    pub fn invalid_booking_data(message: impl Into<String>) -> Self {
        PaymentError::InvalidBookingData(message.into())
    }
}
