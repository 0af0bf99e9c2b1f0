//! Payment variants and lifecycle guards
//!
//! The five payment kinds form a closed set, modelled as an enum so a missing
//! match arm is a compile error when a variant is added. Capabilities:
//!
//! | Variant       | Cancellable | Bookable | Reference code | Transaction id |
//! |---------------|-------------|----------|----------------|----------------|
//! | Direct debit  | yes         | no       | no             | no             |
//! | Credit card   | no          | yes      | no             | yes            |
//! | PayPal        | no          | yes      | no             | yes            |
//! | Bank transfer | yes         | no       | yes            | no             |
//! | Sofort        | no          | yes      | yes            | yes            |
//!
//! All transition guards live on [`Payment`]; services load a payment, call a
//! guarded transition, and persist the result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Euro, PaymentId, PaymentIdSource};
use domain_refcode::ReferenceCode;

use crate::booking::BookingData;
use crate::error::PaymentError;
use crate::iban::Iban;
use crate::interval::PaymentInterval;

/// Discriminator for the payment variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    DirectDebit,
    CreditCard,
    PayPal,
    BankTransfer,
    Sofort,
}

impl fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentKind::DirectDebit => "direct debit",
            PaymentKind::CreditCard => "credit card",
            PaymentKind::PayPal => "PayPal",
            PaymentKind::BankTransfer => "bank transfer",
            PaymentKind::Sofort => "Sofort",
        };
        write!(f, "{}", name)
    }
}

/// SEPA direct debit payment; cancellable, not bookable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectDebitPayment {
    pub id: PaymentId,
    pub amount: Euro,
    pub interval: PaymentInterval,
    pub iban: Iban,
    pub bic: String,
    cancelled: bool,
    booked: bool,
}

impl DirectDebitPayment {
    pub fn new(
        id: PaymentId,
        amount: Euro,
        interval: PaymentInterval,
        iban: Iban,
        bic: impl Into<String>,
    ) -> Self {
        Self {
            id,
            amount,
            interval,
            iban,
            bic: bic.into(),
            cancelled: false,
            booked: false,
        }
    }

    /// Records that the debit was confirmed by an external process
    /// (e.g. a bank statement import). Cancellation does not undo this.
    pub fn mark_booked(&mut self) {
        self.booked = true;
    }

    pub fn is_booked(&self) -> bool {
        self.booked
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Credit card payment; booked once by the card provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCardPayment {
    pub id: PaymentId,
    pub amount: Euro,
    pub interval: PaymentInterval,
    booking: Option<BookingData>,
}

impl CreditCardPayment {
    pub fn new(id: PaymentId, amount: Euro, interval: PaymentInterval) -> Self {
        Self {
            id,
            amount,
            interval,
            booking: None,
        }
    }

    pub fn is_booked(&self) -> bool {
        self.booking.is_some()
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.booking.as_ref().and_then(BookingData::transaction_id)
    }
}

/// PayPal payment; recurring payments grow a family of booked follow-ups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPalPayment {
    pub id: PaymentId,
    pub amount: Euro,
    pub interval: PaymentInterval,
    /// Lookup key to the family root; never an owning reference
    pub parent_payment_id: Option<PaymentId>,
    transaction_id: Option<String>,
    booking: Option<BookingData>,
}

impl PayPalPayment {
    pub fn new(id: PaymentId, amount: Euro, interval: PaymentInterval) -> Self {
        Self {
            id,
            amount,
            interval,
            parent_payment_id: None,
            transaction_id: None,
            booking: None,
        }
    }

    pub fn is_booked(&self) -> bool {
        self.booking.is_some()
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    /// Returns the id of the family root: the parent if this is a follow-up,
    /// otherwise the payment itself
    pub fn family_root(&self) -> PaymentId {
        self.parent_payment_id.unwrap_or(self.id)
    }

    fn record_booking(&mut self, data: &BookingData) -> Result<(), PaymentError> {
        let transaction_id = data.transaction_id().ok_or_else(|| {
            PaymentError::invalid_booking_data("PayPal booking is missing a transaction id")
        })?;
        self.transaction_id = Some(transaction_id.to_string());
        self.booking = Some(data.clone());
        Ok(())
    }

    /// Creates the booked payment for the next cycle of a recurring payment,
    /// linked to this payment's family root
    fn create_follow_up(
        &self,
        id: PaymentId,
        data: &BookingData,
    ) -> Result<PayPalPayment, PaymentError> {
        let mut follow_up = PayPalPayment::new(id, self.amount, self.interval);
        follow_up.parent_payment_id = Some(self.family_root());
        follow_up.record_booking(data)?;
        Ok(follow_up)
    }
}

/// Bank transfer payment; identified by its reference code, cancellable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankTransferPayment {
    pub id: PaymentId,
    pub amount: Euro,
    pub interval: PaymentInterval,
    reference_code: ReferenceCode,
    cancelled: bool,
    booked: bool,
}

impl BankTransferPayment {
    pub fn new(
        id: PaymentId,
        amount: Euro,
        interval: PaymentInterval,
        reference_code: ReferenceCode,
    ) -> Self {
        Self {
            id,
            amount,
            interval,
            reference_code,
            cancelled: false,
            booked: false,
        }
    }

    /// The code is assigned at creation and immutable afterwards
    pub fn reference_code(&self) -> &ReferenceCode {
        &self.reference_code
    }

    /// Records that the transfer arrived on the bank account.
    /// Cancellation does not undo this.
    pub fn mark_booked(&mut self) {
        self.booked = true;
    }

    pub fn is_booked(&self) -> bool {
        self.booked
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Sofort payment; booked with the valuation date of the transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SofortPayment {
    pub id: PaymentId,
    pub amount: Euro,
    pub interval: PaymentInterval,
    reference_code: ReferenceCode,
    valuation_date: Option<DateTime<Utc>>,
    booking: Option<BookingData>,
}

impl SofortPayment {
    pub fn new(
        id: PaymentId,
        amount: Euro,
        interval: PaymentInterval,
        reference_code: ReferenceCode,
    ) -> Self {
        Self {
            id,
            amount,
            interval,
            reference_code,
            valuation_date: None,
            booking: None,
        }
    }

    pub fn reference_code(&self) -> &ReferenceCode {
        &self.reference_code
    }

    pub fn is_booked(&self) -> bool {
        self.valuation_date.is_some()
    }

    pub fn valuation_date(&self) -> Option<DateTime<Utc>> {
        self.valuation_date
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.booking.as_ref().and_then(BookingData::transaction_id)
    }
}

/// A payment in any of its five variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payment {
    DirectDebit(DirectDebitPayment),
    CreditCard(CreditCardPayment),
    PayPal(PayPalPayment),
    BankTransfer(BankTransferPayment),
    Sofort(SofortPayment),
}

impl Payment {
    pub fn id(&self) -> PaymentId {
        match self {
            Payment::DirectDebit(p) => p.id,
            Payment::CreditCard(p) => p.id,
            Payment::PayPal(p) => p.id,
            Payment::BankTransfer(p) => p.id,
            Payment::Sofort(p) => p.id,
        }
    }

    pub fn amount(&self) -> Euro {
        match self {
            Payment::DirectDebit(p) => p.amount,
            Payment::CreditCard(p) => p.amount,
            Payment::PayPal(p) => p.amount,
            Payment::BankTransfer(p) => p.amount,
            Payment::Sofort(p) => p.amount,
        }
    }

    pub fn interval(&self) -> PaymentInterval {
        match self {
            Payment::DirectDebit(p) => p.interval,
            Payment::CreditCard(p) => p.interval,
            Payment::PayPal(p) => p.interval,
            Payment::BankTransfer(p) => p.interval,
            Payment::Sofort(p) => p.interval,
        }
    }

    pub fn kind(&self) -> PaymentKind {
        match self {
            Payment::DirectDebit(_) => PaymentKind::DirectDebit,
            Payment::CreditCard(_) => PaymentKind::CreditCard,
            Payment::PayPal(_) => PaymentKind::PayPal,
            Payment::BankTransfer(_) => PaymentKind::BankTransfer,
            Payment::Sofort(_) => PaymentKind::Sofort,
        }
    }

    pub fn is_booked(&self) -> bool {
        match self {
            Payment::DirectDebit(p) => p.is_booked(),
            Payment::CreditCard(p) => p.is_booked(),
            Payment::PayPal(p) => p.is_booked(),
            Payment::BankTransfer(p) => p.is_booked(),
            Payment::Sofort(p) => p.is_booked(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        match self {
            Payment::DirectDebit(p) => p.is_cancelled(),
            Payment::BankTransfer(p) => p.is_cancelled(),
            Payment::CreditCard(_) | Payment::PayPal(_) | Payment::Sofort(_) => false,
        }
    }

    /// True for cancellable variants that are not yet cancelled
    pub fn is_cancellable(&self) -> bool {
        match self {
            Payment::DirectDebit(p) => !p.cancelled,
            Payment::BankTransfer(p) => !p.cancelled,
            Payment::CreditCard(_) | Payment::PayPal(_) | Payment::Sofort(_) => false,
        }
    }

    /// True for cancellable variants that are currently cancelled
    pub fn is_restorable(&self) -> bool {
        match self {
            Payment::DirectDebit(p) => p.cancelled,
            Payment::BankTransfer(p) => p.cancelled,
            Payment::CreditCard(_) | Payment::PayPal(_) | Payment::Sofort(_) => false,
        }
    }

    /// Booked and not cancelled; callers use this to decide whether
    /// completion side effects should fire after a cancel or restore
    pub fn is_completed(&self) -> bool {
        self.is_booked() && !self.is_cancelled()
    }

    /// Cancels the payment
    ///
    /// The booked flag survives cancellation: booking history is never erased.
    pub fn cancel(&mut self) -> Result<(), PaymentError> {
        if !self.is_cancellable() {
            return Err(PaymentError::invalid_state(format!(
                "{} payment {} cannot be cancelled",
                self.kind(),
                self.id()
            )));
        }
        match self {
            Payment::DirectDebit(p) => p.cancelled = true,
            Payment::BankTransfer(p) => p.cancelled = true,
            // is_cancellable() rules these out
            Payment::CreditCard(_) | Payment::PayPal(_) | Payment::Sofort(_) => {}
        }
        Ok(())
    }

    /// Restores a cancelled payment
    pub fn restore(&mut self) -> Result<(), PaymentError> {
        if !self.is_restorable() {
            return Err(PaymentError::invalid_state(format!(
                "{} payment {} is not cancelled and cannot be restored",
                self.kind(),
                self.id()
            )));
        }
        match self {
            Payment::DirectDebit(p) => p.cancelled = false,
            Payment::BankTransfer(p) => p.cancelled = false,
            Payment::CreditCard(_) | Payment::PayPal(_) | Payment::Sofort(_) => {}
        }
        Ok(())
    }

    /// Books the payment with provider data
    ///
    /// For a booked recurring PayPal payment this mints a booked follow-up
    /// payment via `id_source` and returns it for the caller to persist;
    /// injecting a failing id source statically forbids follow-up creation at
    /// call sites where it is disallowed. All other successful bookings
    /// return `None`.
    pub fn book_payment(
        &mut self,
        data: &BookingData,
        id_source: &dyn PaymentIdSource,
    ) -> Result<Option<Payment>, PaymentError> {
        match self {
            Payment::CreditCard(p) => {
                if p.is_booked() {
                    return Err(PaymentError::invalid_state(format!(
                        "credit card payment {} is already booked",
                        p.id
                    )));
                }
                if data.transaction_id().is_none() {
                    return Err(PaymentError::invalid_booking_data(
                        "credit card booking is missing a transaction id",
                    ));
                }
                p.booking = Some(data.clone());
                Ok(None)
            }
            Payment::Sofort(p) => {
                if p.is_booked() {
                    return Err(PaymentError::invalid_state(format!(
                        "Sofort payment {} is already booked",
                        p.id
                    )));
                }
                let valuation_date = data.valuation_date().ok_or_else(|| {
                    PaymentError::invalid_booking_data(
                        "Sofort booking is missing a valid valuation date",
                    )
                })?;
                p.valuation_date = Some(valuation_date);
                p.booking = Some(data.clone());
                Ok(None)
            }
            Payment::PayPal(p) => {
                if !p.is_booked() {
                    p.record_booking(data)?;
                    return Ok(None);
                }
                if !p.interval.is_recurring() {
                    return Err(PaymentError::invalid_state(format!(
                        "one-time PayPal payment {} is already booked",
                        p.id
                    )));
                }
                let follow_up_id = id_source.next_id()?;
                let follow_up = p.create_follow_up(follow_up_id, data)?;
                Ok(Some(Payment::PayPal(follow_up)))
            }
            Payment::DirectDebit(_) | Payment::BankTransfer(_) => {
                Err(PaymentError::invalid_state(format!(
                    "{} payment {} cannot be booked through a provider",
                    self.kind(),
                    self.id()
                )))
            }
        }
    }

    /// Returns the reference code for code-bearing variants
    pub fn reference_code(&self) -> Option<&ReferenceCode> {
        match self {
            Payment::BankTransfer(p) => Some(p.reference_code()),
            Payment::Sofort(p) => Some(p.reference_code()),
            Payment::DirectDebit(_) | Payment::CreditCard(_) | Payment::PayPal(_) => None,
        }
    }

    /// Returns the provider transaction id, if one has been recorded
    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            Payment::CreditCard(p) => p.transaction_id(),
            Payment::PayPal(p) => p.transaction_id(),
            Payment::Sofort(p) => p.transaction_id(),
            Payment::DirectDebit(_) | Payment::BankTransfer(_) => None,
        }
    }

    /// Returns the parent lookup key of a PayPal follow-up payment
    pub fn parent_payment_id(&self) -> Option<PaymentId> {
        match self {
            Payment::PayPal(p) => p.parent_payment_id,
            _ => None,
        }
    }

    /// Returns the IBAN of payments that carry bank account data
    pub fn iban(&self) -> Option<&Iban> {
        match self {
            Payment::DirectDebit(p) => Some(&p.iban),
            _ => None,
        }
    }
}
