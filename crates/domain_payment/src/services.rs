//! Payment use-case services
//!
//! Each service performs one read-modify-write cycle against the payment
//! store: load a payment, ask it for a capability-gated transition, persist
//! the result. Business failures (`InvalidAmount`, `VerificationFailed`,
//! `InvalidStateTransition`, `NotFound`) surface as the `Err` arm of the
//! returned `Result`; the `Ok` arm carries the success response.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use core_kernel::{Euro, PaymentId, PaymentIdSource, PortError};
use domain_refcode::UniqueReferenceCodeGenerator;

use crate::booking::BookingData;
use crate::error::PaymentError;
use crate::iban::Iban;
use crate::interval::PaymentInterval;
use crate::payment::{
    BankTransferPayment, CreditCardPayment, DirectDebitPayment, Payment, PaymentKind,
    PayPalPayment, SofortPayment,
};
use crate::ports::{BankData, BankDataEnricher, ExternalVerifier, PaymentStore, UnusableIdSource};
use crate::transaction_index::TransactionIndex;

/// Loads a payment, mapping a missing entity to the domain-level failure
async fn load_payment(
    store: &Arc<dyn PaymentStore>,
    id: PaymentId,
) -> Result<Payment, PaymentError> {
    store.get_payment(id).await.map_err(|error| {
        if error.is_not_found() {
            PaymentError::NotFound(id)
        } else {
            error.into()
        }
    })
}

/// Validates a raw cent amount, failing closed on anything non-positive
fn positive_amount(amount_in_cents: i64) -> Result<Euro, PaymentError> {
    let amount = Euro::from_cents(amount_in_cents)
        .map_err(|error| PaymentError::InvalidAmount(error.to_string()))?;
    if !amount.is_positive() {
        return Err(PaymentError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(amount)
}

// ============================================================================
// Create payment
// ============================================================================

/// Kind-specific data for creating a payment
#[derive(Debug, Clone)]
pub enum NewPaymentKind {
    DirectDebit { iban: String, bic: String },
    CreditCard,
    PayPal,
    BankTransfer { code_prefix: String },
    Sofort { code_prefix: String },
}

/// Request for creating a new, unbooked payment
#[derive(Debug, Clone)]
pub struct CreatePaymentRequest {
    pub amount_in_cents: i64,
    pub interval: PaymentInterval,
    pub kind: NewPaymentKind,
}

/// Response of a successful payment creation
#[derive(Debug, Clone)]
pub struct PaymentCreated {
    pub payment_id: PaymentId,
    /// Formatted reference code for bank-transfer and Sofort payments
    pub reference_code: Option<String>,
}

/// Creates payments of every kind
///
/// Bank-transfer and Sofort payments receive a unique reference code at
/// creation; the code and the payment are persisted in the same operation.
pub struct CreatePaymentService {
    store: Arc<dyn PaymentStore>,
    id_source: Arc<dyn PaymentIdSource>,
    code_generator: Mutex<UniqueReferenceCodeGenerator>,
}

impl CreatePaymentService {
    pub fn new(
        store: Arc<dyn PaymentStore>,
        id_source: Arc<dyn PaymentIdSource>,
        code_generator: UniqueReferenceCodeGenerator,
    ) -> Self {
        Self {
            store,
            id_source,
            code_generator: Mutex::new(code_generator),
        }
    }

    pub async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<PaymentCreated, PaymentError> {
        let amount = positive_amount(request.amount_in_cents)?;

        // Validate kind-specific inputs and allocate the reference code
        // before consuming a payment id: the id is assigned exactly once,
        // immediately before persistence.
        let payment = match request.kind {
            NewPaymentKind::DirectDebit { iban, bic } => {
                let iban = Iban::new(&iban)?;
                Payment::DirectDebit(DirectDebitPayment::new(
                    self.id_source.next_id()?,
                    amount,
                    request.interval,
                    iban,
                    bic,
                ))
            }
            NewPaymentKind::CreditCard => Payment::CreditCard(CreditCardPayment::new(
                self.id_source.next_id()?,
                amount,
                request.interval,
            )),
            NewPaymentKind::PayPal => Payment::PayPal(PayPalPayment::new(
                self.id_source.next_id()?,
                amount,
                request.interval,
            )),
            NewPaymentKind::BankTransfer { code_prefix } => {
                let code = self
                    .code_generator
                    .lock()
                    .await
                    .new_payment_reference(&code_prefix)
                    .await?;
                Payment::BankTransfer(BankTransferPayment::new(
                    self.id_source.next_id()?,
                    amount,
                    request.interval,
                    code,
                ))
            }
            NewPaymentKind::Sofort { code_prefix } => {
                let code = self
                    .code_generator
                    .lock()
                    .await
                    .new_payment_reference(&code_prefix)
                    .await?;
                Payment::Sofort(SofortPayment::new(
                    self.id_source.next_id()?,
                    amount,
                    request.interval,
                    code,
                ))
            }
        };

        self.store.save_payment(&payment).await?;
        info!(
            payment_id = %payment.id(),
            kind = %payment.kind(),
            amount_cents = payment.amount().cents(),
            "created payment"
        );

        Ok(PaymentCreated {
            payment_id: payment.id(),
            reference_code: payment.reference_code().map(|code| code.formatted()),
        })
    }
}

// ============================================================================
// Create + book PayPal payment (inbound provider notification)
// ============================================================================

/// Inbound PayPal notification for a payment without a prior id
#[derive(Debug, Clone)]
pub struct PayPalNotification {
    pub amount_in_cents: i64,
    pub interval: PaymentInterval,
    pub transaction_data: BookingData,
}

/// Response of the create-and-book path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayPalBookingOutcome {
    pub payment_id: PaymentId,
    /// True if the notification was a duplicate and no new payment was created
    pub already_processed: bool,
}

/// Creates a PayPal payment from a provider notification and books it
/// immediately
///
/// The immediate booking is performed with the failing id source, so a
/// follow-up payment can never be minted on this path.
pub struct BookPayPalPaymentService {
    store: Arc<dyn PaymentStore>,
    id_source: Arc<dyn PaymentIdSource>,
    verifier: Arc<dyn ExternalVerifier>,
}

impl BookPayPalPaymentService {
    pub fn new(
        store: Arc<dyn PaymentStore>,
        id_source: Arc<dyn PaymentIdSource>,
        verifier: Arc<dyn ExternalVerifier>,
    ) -> Self {
        Self {
            store,
            id_source,
            verifier,
        }
    }

    pub async fn create_booked_payment(
        &self,
        notification: PayPalNotification,
    ) -> Result<PayPalBookingOutcome, PaymentError> {
        let amount = positive_amount(notification.amount_in_cents)?;
        let transaction_id = notification
            .transaction_data
            .transaction_id()
            .ok_or_else(|| {
                PaymentError::invalid_booking_data("notification carries no transaction id")
            })?
            .to_string();

        let index = TransactionIndex::new(self.store.clone());
        if let Some(existing) = index.find_payment(&transaction_id).await? {
            warn!(
                transaction_id = %transaction_id,
                payment_id = %existing.id(),
                "duplicate PayPal notification, keeping existing payment"
            );
            return Ok(PayPalBookingOutcome {
                payment_id: existing.id(),
                already_processed: true,
            });
        }

        let verification = self.verifier.validate(&notification.transaction_data).await?;
        if !verification.is_valid {
            return Err(PaymentError::VerificationFailed(
                verification.message_or_default(),
            ));
        }

        let id = self.id_source.next_id()?;
        let mut payment = Payment::PayPal(PayPalPayment::new(id, amount, notification.interval));
        payment.book_payment(&notification.transaction_data, &UnusableIdSource)?;
        self.store.save_payment(&payment).await?;
        info!(payment_id = %id, transaction_id = %transaction_id, "booked new PayPal payment");

        Ok(PayPalBookingOutcome {
            payment_id: id,
            already_processed: false,
        })
    }
}

// ============================================================================
// Book an existing payment
// ============================================================================

/// Response of booking an existing payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingOutcome {
    pub payment_id: PaymentId,
    /// Id of the follow-up payment a recurring booking minted, if any
    pub follow_up_payment_id: Option<PaymentId>,
}

/// Books an existing payment with provider data
///
/// Uses the real id source, so a booked recurring PayPal payment receives a
/// follow-up payment for the new cycle; both are persisted.
pub struct BookPaymentService {
    store: Arc<dyn PaymentStore>,
    id_source: Arc<dyn PaymentIdSource>,
    verifier: Arc<dyn ExternalVerifier>,
}

impl BookPaymentService {
    pub fn new(
        store: Arc<dyn PaymentStore>,
        id_source: Arc<dyn PaymentIdSource>,
        verifier: Arc<dyn ExternalVerifier>,
    ) -> Self {
        Self {
            store,
            id_source,
            verifier,
        }
    }

    pub async fn book_payment(
        &self,
        payment_id: PaymentId,
        data: BookingData,
    ) -> Result<BookingOutcome, PaymentError> {
        let mut payment = load_payment(&self.store, payment_id).await?;

        if let Some(transaction_id) = data.transaction_id() {
            let index = TransactionIndex::new(self.store.clone());
            if index.transaction_exists(transaction_id).await? {
                return Err(PaymentError::invalid_state(format!(
                    "transaction {} is already recorded",
                    transaction_id
                )));
            }
        }

        let verification = self.verifier.validate(&data).await?;
        if !verification.is_valid {
            return Err(PaymentError::VerificationFailed(
                verification.message_or_default(),
            ));
        }

        let follow_up = payment.book_payment(&data, self.id_source.as_ref())?;
        // Parent first: a failed follow-up save must not leave a child
        // referencing a parent state that was never written.
        self.store.save_payment(&payment).await?;
        if let Some(follow_up) = &follow_up {
            self.store.save_payment(follow_up).await?;
            debug!(
                payment_id = %payment_id,
                follow_up_id = %follow_up.id(),
                "minted follow-up payment for recurring booking"
            );
        }
        info!(payment_id = %payment_id, "booked payment");

        Ok(BookingOutcome {
            payment_id,
            follow_up_payment_id: follow_up.map(|p| p.id()),
        })
    }
}

// ============================================================================
// Cancel / restore
// ============================================================================

/// Response of a cancel or restore operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationOutcome {
    pub payment_id: PaymentId,
    /// Completion state after the transition, for downstream effects
    pub is_completed: bool,
}

/// Cancels and restores cancellable payments
pub struct CancelPaymentService {
    store: Arc<dyn PaymentStore>,
}

impl CancelPaymentService {
    pub fn new(store: Arc<dyn PaymentStore>) -> Self {
        Self { store }
    }

    pub async fn cancel_payment(
        &self,
        payment_id: PaymentId,
    ) -> Result<CancellationOutcome, PaymentError> {
        let mut payment = load_payment(&self.store, payment_id).await?;
        payment.cancel()?;
        self.store.save_payment(&payment).await?;
        info!(payment_id = %payment_id, "cancelled payment");

        Ok(CancellationOutcome {
            payment_id,
            is_completed: payment.is_completed(),
        })
    }

    pub async fn restore_payment(
        &self,
        payment_id: PaymentId,
    ) -> Result<CancellationOutcome, PaymentError> {
        let mut payment = load_payment(&self.store, payment_id).await?;
        payment.restore()?;
        self.store.save_payment(&payment).await?;
        info!(payment_id = %payment_id, "restored payment");

        Ok(CancellationOutcome {
            payment_id,
            is_completed: payment.is_completed(),
        })
    }
}

// ============================================================================
// Read-side projection
// ============================================================================

/// Display-safe projection of a payment
#[derive(Debug, Clone, serde::Serialize)]
pub struct PaymentDisplayInfo {
    pub payment_id: PaymentId,
    pub kind: PaymentKind,
    pub amount: Euro,
    pub interval: PaymentInterval,
    pub is_booked: bool,
    pub is_cancelled: bool,
    pub is_completed: bool,
    pub reference_code: Option<String>,
    pub transaction_id: Option<String>,
    pub iban: Option<String>,
    pub bank_data: Option<BankData>,
}

/// Read-side projection of a single payment
///
/// A missing payment on this path is a caller bug, since identifiers
/// obtained from the system are expected to stay valid. `PortError::NotFound`
/// therefore propagates instead of mapping to a business failure.
pub struct GetPaymentService {
    store: Arc<dyn PaymentStore>,
    bank_data: Arc<dyn BankDataEnricher>,
}

impl GetPaymentService {
    pub fn new(store: Arc<dyn PaymentStore>, bank_data: Arc<dyn BankDataEnricher>) -> Self {
        Self { store, bank_data }
    }

    pub async fn get_payment(&self, payment_id: PaymentId) -> Result<PaymentDisplayInfo, PortError> {
        let payment = self.store.get_payment(payment_id).await?;

        let bank_data = match payment.iban() {
            Some(iban) => Some(self.bank_data.from_iban(iban).await?),
            None => None,
        };

        Ok(PaymentDisplayInfo {
            payment_id: payment.id(),
            kind: payment.kind(),
            amount: payment.amount(),
            interval: payment.interval(),
            is_booked: payment.is_booked(),
            is_cancelled: payment.is_cancelled(),
            is_completed: payment.is_completed(),
            reference_code: payment.reference_code().map(|code| code.formatted()),
            transaction_id: payment.transaction_id().map(str::to_string),
            iban: payment.iban().map(|iban| iban.as_str().to_string()),
            bank_data,
        })
    }
}
