//! Test data builders
//!
//! Builders let tests specify only the fields they care about while using
//! defaults for everything else.

use core_kernel::{Euro, PaymentId};
use domain_payment::{
    BankTransferPayment, CreditCardPayment, DirectDebitPayment, Payment, PaymentInterval,
    PayPalPayment, SofortPayment,
};

use crate::fixtures::{test_reference_code, valid_iban};

/// Builder for payments of any kind with test defaults
pub struct TestPaymentBuilder {
    id: PaymentId,
    amount: Euro,
    interval: PaymentInterval,
    code_prefix: String,
}

impl Default for TestPaymentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPaymentBuilder {
    pub fn new() -> Self {
        Self {
            id: PaymentId::new(1),
            amount: Euro::from_cents(999).expect("default amount is valid"),
            interval: PaymentInterval::OneTime,
            code_prefix: "XW".to_string(),
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = PaymentId::new(id);
        self
    }

    pub fn with_amount_cents(mut self, cents: i64) -> Self {
        self.amount = Euro::from_cents(cents).expect("builder amount must be valid");
        self
    }

    pub fn with_interval(mut self, interval: PaymentInterval) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_code_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.code_prefix = prefix.into();
        self
    }

    pub fn build_direct_debit(self) -> Payment {
        Payment::DirectDebit(DirectDebitPayment::new(
            self.id,
            self.amount,
            self.interval,
            valid_iban(),
            "COBADEFFXXX",
        ))
    }

    pub fn build_credit_card(self) -> Payment {
        Payment::CreditCard(CreditCardPayment::new(self.id, self.amount, self.interval))
    }

    pub fn build_paypal(self) -> Payment {
        Payment::PayPal(PayPalPayment::new(self.id, self.amount, self.interval))
    }

    pub fn build_bank_transfer(self) -> Payment {
        Payment::BankTransfer(BankTransferPayment::new(
            self.id,
            self.amount,
            self.interval,
            test_reference_code(&self.code_prefix),
        ))
    }

    pub fn build_sofort(self) -> Payment {
        Payment::Sofort(SofortPayment::new(
            self.id,
            self.amount,
            self.interval,
            test_reference_code(&self.code_prefix),
        ))
    }
}
