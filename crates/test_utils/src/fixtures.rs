//! Deterministic fixtures and collaborator doubles

use async_trait::async_trait;
use once_cell::sync::Lazy;

use core_kernel::{DomainPort, PortError};
use domain_payment::booking::{KEY_PAYPAL_TRANSACTION_ID, KEY_TRANSACTION_ID, KEY_VALUATION_DATE};
use domain_payment::{
    BankData, BankDataEnricher, BookingData, ExternalVerifier, Iban, VerificationResult,
};
use domain_refcode::{ReferenceCode, ReferenceCodeGenerator, SequentialIndexSource};

/// Initialises tracing output for tests, exactly once per process
pub fn init_test_logging() {
    static INIT: Lazy<()> = Lazy::new(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init()
            .ok();
    });
    Lazy::force(&INIT);
}

/// The well-known valid test IBAN
pub fn valid_iban() -> Iban {
    Iban::new("DE89370400440532013000").expect("test IBAN is valid")
}

/// Generates a deterministic reference code for the given prefix
pub fn test_reference_code(prefix: &str) -> ReferenceCode {
    ReferenceCodeGenerator::new(Box::new(SequentialIndexSource::new()))
        .new_payment_reference(prefix)
        .expect("test prefix must be valid")
}

/// PayPal booking data carrying a transaction id
pub fn paypal_booking(transaction_id: &str) -> BookingData {
    BookingData::new()
        .with(KEY_PAYPAL_TRANSACTION_ID, transaction_id)
        .with("payer_id", "TESTPAYER")
}

/// Sofort booking data carrying a transaction id and valuation date
pub fn sofort_booking(transaction_id: &str) -> BookingData {
    BookingData::new()
        .with(KEY_TRANSACTION_ID, transaction_id)
        .with(KEY_VALUATION_DATE, "2024-03-01T12:00:00Z")
}

/// Verifier that always returns the configured outcome
pub struct StaticVerifier {
    result: VerificationResult,
}

impl StaticVerifier {
    pub fn approving() -> Self {
        Self {
            result: VerificationResult::valid(),
        }
    }

    pub fn denying(message: &str) -> Self {
        Self {
            result: VerificationResult::invalid(message),
        }
    }
}

impl DomainPort for StaticVerifier {}

#[async_trait]
impl ExternalVerifier for StaticVerifier {
    async fn validate(&self, _data: &BookingData) -> Result<VerificationResult, PortError> {
        Ok(self.result.clone())
    }
}

/// Enricher that returns fixed bank metadata for any IBAN
#[derive(Debug, Default)]
pub struct StaticBankDataEnricher;

impl DomainPort for StaticBankDataEnricher {}

#[async_trait]
impl BankDataEnricher for StaticBankDataEnricher {
    async fn from_iban(&self, iban: &Iban) -> Result<BankData, PortError> {
        Ok(BankData {
            bic: "COBADEFFXXX".to_string(),
            account_number: iban.as_str().chars().skip(12).collect(),
            bank_code: iban.as_str().chars().skip(4).take(8).collect(),
            bank_name: "Commerzbank Köln".to_string(),
        })
    }
}
