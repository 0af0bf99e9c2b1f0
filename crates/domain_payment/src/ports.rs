//! Payment Domain Ports
//!
//! Port traits the payment domain needs from its collaborators: the payment
//! store, the external transaction verifier, and the bank data enrichment
//! used by read-side projections. Adapters live in `infra_memory` (and, in a
//! deployment, behind a database or provider HTTP client).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, PaymentId, PaymentIdSource, PortError};

use crate::booking::BookingData;
use crate::iban::Iban;
use crate::payment::Payment;

/// Persistence port for payments
///
/// The store owns exclusive access during a lifecycle operation; each use
/// case performs one read-modify-write cycle. Cross-operation locking is a
/// caller-coordination concern.
#[async_trait]
pub trait PaymentStore: DomainPort {
    /// Retrieves a payment by id, or `PortError::NotFound`
    async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError>;

    /// Persists a payment, inserting or replacing by id
    async fn save_payment(&self, payment: &Payment) -> Result<(), PortError>;

    /// Returns all follow-up payments whose family root is the given id
    async fn find_follow_ups(&self, root_id: PaymentId) -> Result<Vec<Payment>, PortError>;

    /// Finds the payment that recorded the given provider transaction id
    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, PortError>;
}

/// Outcome of an external transaction verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub is_valid: bool,
    pub message: Option<String>,
}

impl VerificationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
        }
    }

    /// Returns the provider message, or a generic fallback
    pub fn message_or_default(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "transaction was rejected by the payment provider".to_string())
    }
}

/// External verification of provider transaction data
///
/// Timeouts and transport failures surface as `PortError` from the adapter.
#[async_trait]
pub trait ExternalVerifier: DomainPort {
    async fn validate(&self, data: &BookingData) -> Result<VerificationResult, PortError>;
}

/// Bank metadata derived from an IBAN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankData {
    pub bic: String,
    pub account_number: String,
    pub bank_code: String,
    pub bank_name: String,
}

/// Derives bank metadata for display projections
#[async_trait]
pub trait BankDataEnricher: DomainPort {
    async fn from_iban(&self, iban: &Iban) -> Result<BankData, PortError>;
}

/// Id source that always fails
///
/// Injected where minting a new payment is disallowed: the immediate booking
/// of a freshly created PayPal payment must never create a follow-up.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnusableIdSource;

impl PaymentIdSource for UnusableIdSource {
    fn next_id(&self) -> Result<PaymentId, PortError> {
        Err(PortError::internal(
            "payment creation is not allowed in this context",
        ))
    }
}
