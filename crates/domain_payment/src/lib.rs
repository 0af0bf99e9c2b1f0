//! Payment Domain - lifecycle of donation and membership payments
//!
//! This crate models the five payment kinds of the donation system as a
//! closed, exhaustively matchable variant set. Each variant carries a
//! capability set (cancellable, bookable, code-bearing) and the enum
//! centralises every state-transition guard, so use-case services never
//! duplicate business rules.
//!
//! Lifecycle: every payment starts unbooked. Bookable payments transition to
//! booked when an external provider confirms them; cancellable payments move
//! between active and cancelled via cancel/restore. A payment is completed
//! when it is booked and not cancelled.
//!
//! # Example
//!
//! ```rust,ignore
//! let service = CancelPaymentService::new(store);
//! match service.cancel_payment(payment_id).await {
//!     Ok(outcome) => println!("cancelled, completed={}", outcome.is_completed),
//!     Err(PaymentError::InvalidStateTransition(reason)) => println!("{}", reason),
//!     Err(other) => return Err(other.into()),
//! }
//! ```

pub mod booking;
pub mod error;
pub mod iban;
pub mod interval;
pub mod payment;
pub mod ports;
pub mod services;
pub mod transaction_index;

pub use booking::BookingData;
pub use error::PaymentError;
pub use iban::{Iban, IbanError};
pub use interval::PaymentInterval;
pub use payment::{
    BankTransferPayment, CreditCardPayment, DirectDebitPayment, Payment, PaymentKind,
    PayPalPayment, SofortPayment,
};
pub use ports::{
    BankData, BankDataEnricher, ExternalVerifier, PaymentStore, UnusableIdSource,
    VerificationResult,
};
pub use services::{
    BookingOutcome, BookPaymentService, BookPayPalPaymentService, CancellationOutcome,
    CancelPaymentService, CreatePaymentRequest, CreatePaymentService, GetPaymentService,
    NewPaymentKind, PaymentCreated, PaymentDisplayInfo, PayPalBookingOutcome, PayPalNotification,
};
pub use transaction_index::TransactionIndex;
