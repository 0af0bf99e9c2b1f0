//! Shared test utilities for the payment system
//!
//! Builders construct payments with sensible defaults, fixtures provide
//! deterministic collaborator implementations (verifier, bank data,
//! reference codes), and `init_test_logging` wires `tracing` output into
//! test runs exactly once.

pub mod builders;
pub mod fixtures;

pub use builders::TestPaymentBuilder;
pub use fixtures::{
    init_test_logging, paypal_booking, sofort_booking, test_reference_code, valid_iban,
    StaticBankDataEnricher, StaticVerifier,
};
