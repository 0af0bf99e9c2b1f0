//! End-to-end lifecycle scenarios wired through the in-memory adapters

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use core_kernel::{DomainPort, PaymentId, PortError};
use domain_payment::{
    BookPayPalPaymentService, BookPaymentService, CancelPaymentService, CreatePaymentRequest,
    CreatePaymentService, GetPaymentService, NewPaymentKind, Payment, PaymentError,
    PaymentInterval, PaymentKind, PaymentStore, PayPalNotification,
};
use domain_refcode::{ReferenceCodeGenerator, SequentialIndexSource, UniqueReferenceCodeGenerator};
use infra_memory::{InMemoryPaymentStore, SequentialIdSource};
use test_utils::{
    init_test_logging, paypal_booking, valid_iban, StaticBankDataEnricher, StaticVerifier,
    TestPaymentBuilder,
};

/// Counts writes so tests can assert that a failed use case never persisted
struct SpyStore {
    inner: InMemoryPaymentStore,
    saves: AtomicUsize,
}

impl SpyStore {
    fn new() -> Self {
        Self {
            inner: InMemoryPaymentStore::new(),
            saves: AtomicUsize::new(0),
        }
    }

    fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl DomainPort for SpyStore {}

#[async_trait]
impl PaymentStore for SpyStore {
    async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError> {
        self.inner.get_payment(id).await
    }

    async fn save_payment(&self, payment: &Payment) -> Result<(), PortError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save_payment(payment).await
    }

    async fn find_follow_ups(&self, root_id: PaymentId) -> Result<Vec<Payment>, PortError> {
        self.inner.find_follow_ups(root_id).await
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, PortError> {
        self.inner.find_by_transaction_id(transaction_id).await
    }
}

/// Accepts every write except follow-up payments
struct FollowUpRejectingStore {
    inner: InMemoryPaymentStore,
}

impl FollowUpRejectingStore {
    fn new() -> Self {
        Self {
            inner: InMemoryPaymentStore::new(),
        }
    }
}

impl DomainPort for FollowUpRejectingStore {}

#[async_trait]
impl PaymentStore for FollowUpRejectingStore {
    async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError> {
        self.inner.get_payment(id).await
    }

    async fn save_payment(&self, payment: &Payment) -> Result<(), PortError> {
        if payment.parent_payment_id().is_some() {
            return Err(PortError::internal("storage rejected the write"));
        }
        self.inner.save_payment(payment).await
    }

    async fn find_follow_ups(&self, root_id: PaymentId) -> Result<Vec<Payment>, PortError> {
        self.inner.find_follow_ups(root_id).await
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, PortError> {
        self.inner.find_by_transaction_id(transaction_id).await
    }
}

fn create_service(store: Arc<InMemoryPaymentStore>) -> CreatePaymentService {
    let code_generator = UniqueReferenceCodeGenerator::new(
        ReferenceCodeGenerator::new(Box::new(SequentialIndexSource::new())),
        store.clone(),
    );
    CreatePaymentService::new(store, Arc::new(SequentialIdSource::new()), code_generator)
}

fn paypal_request(amount_in_cents: i64, interval: PaymentInterval) -> CreatePaymentRequest {
    CreatePaymentRequest {
        amount_in_cents,
        interval,
        kind: NewPaymentKind::PayPal,
    }
}

#[tokio::test]
async fn test_created_paypal_payment_books_once() {
    init_test_logging();
    let store = Arc::new(InMemoryPaymentStore::new());
    let id_source = Arc::new(SequentialIdSource::new());

    let created = create_service(store.clone())
        .create_payment(paypal_request(2500, PaymentInterval::OneTime))
        .await
        .unwrap();
    assert!(created.reference_code.is_none());

    let booking = BookPaymentService::new(
        store.clone(),
        id_source,
        Arc::new(StaticVerifier::approving()),
    );
    let outcome = booking
        .book_payment(created.payment_id, paypal_booking("8RT-001"))
        .await
        .unwrap();
    assert_eq!(outcome.follow_up_payment_id, None);

    let persisted = store.get_payment(created.payment_id).await.unwrap();
    assert!(persisted.is_booked());
    assert!(persisted.is_completed());
    assert_eq!(persisted.transaction_id(), Some("8RT-001"));

    // A booked one-time payment cannot be booked again.
    let second = booking
        .book_payment(created.payment_id, paypal_booking("8RT-002"))
        .await;
    assert!(matches!(
        second,
        Err(PaymentError::InvalidStateTransition(_))
    ));
}

#[tokio::test]
async fn test_negative_amount_fails_without_persisting() {
    init_test_logging();
    let store = Arc::new(SpyStore::new());
    let service = BookPayPalPaymentService::new(
        store.clone(),
        Arc::new(SequentialIdSource::new()),
        Arc::new(StaticVerifier::approving()),
    );

    let result = service
        .create_booked_payment(PayPalNotification {
            amount_in_cents: -500,
            interval: PaymentInterval::OneTime,
            transaction_data: paypal_booking("8RT-003"),
        })
        .await;

    assert!(matches!(result, Err(PaymentError::InvalidAmount(_))));
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn test_duplicate_notification_keeps_existing_payment() {
    init_test_logging();
    let store = Arc::new(InMemoryPaymentStore::new());
    let service = BookPayPalPaymentService::new(
        store.clone(),
        Arc::new(SequentialIdSource::new()),
        Arc::new(StaticVerifier::approving()),
    );

    let notification = PayPalNotification {
        amount_in_cents: 1200,
        interval: PaymentInterval::OneTime,
        transaction_data: paypal_booking("8RT-004"),
    };

    let first = service
        .create_booked_payment(notification.clone())
        .await
        .unwrap();
    assert!(!first.already_processed);

    let second = service.create_booked_payment(notification).await.unwrap();
    assert!(second.already_processed);
    assert_eq!(second.payment_id, first.payment_id);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_failed_verification_surfaces_message_and_persists_nothing() {
    init_test_logging();
    let store = Arc::new(SpyStore::new());
    let service = BookPayPalPaymentService::new(
        store.clone(),
        Arc::new(SequentialIdSource::new()),
        Arc::new(StaticVerifier::denying("payer account locked")),
    );

    let result = service
        .create_booked_payment(PayPalNotification {
            amount_in_cents: 1200,
            interval: PaymentInterval::OneTime,
            transaction_data: paypal_booking("8RT-005"),
        })
        .await;

    match result {
        Err(PaymentError::VerificationFailed(message)) => {
            assert_eq!(message, "payer account locked");
        }
        other => panic!("expected verification failure, got {:?}", other),
    }
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn test_recurring_booking_mints_and_persists_follow_up() {
    init_test_logging();
    let store = Arc::new(InMemoryPaymentStore::new());
    // Start past the parent id minted by `create_service`'s own source so the
    // follow-up id does not collide with the parent in the store.
    let id_source = Arc::new(SequentialIdSource::starting_at(2));

    let created = create_service(store.clone())
        .create_payment(paypal_request(900, PaymentInterval::Monthly))
        .await
        .unwrap();

    let booking = BookPaymentService::new(
        store.clone(),
        id_source,
        Arc::new(StaticVerifier::approving()),
    );
    booking
        .book_payment(created.payment_id, paypal_booking("8RT-006"))
        .await
        .unwrap();

    // The second provider confirmation is a new cycle of the recurring payment.
    let outcome = booking
        .book_payment(created.payment_id, paypal_booking("8RT-007"))
        .await
        .unwrap();
    let follow_up_id = outcome
        .follow_up_payment_id
        .expect("recurring booking should mint a follow-up");

    let follow_up = store.get_payment(follow_up_id).await.unwrap();
    assert!(follow_up.is_booked());
    assert_eq!(follow_up.transaction_id(), Some("8RT-007"));
    assert_eq!(follow_up.parent_payment_id(), Some(created.payment_id));
    assert_eq!(follow_up.amount().cents(), 900);
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn test_failed_follow_up_save_leaves_no_orphan() {
    init_test_logging();
    let store = Arc::new(FollowUpRejectingStore::new());
    let id_source = Arc::new(SequentialIdSource::new());

    let parent = TestPaymentBuilder::new()
        .with_id(1)
        .with_interval(PaymentInterval::Monthly)
        .build_paypal();
    store.save_payment(&parent).await.unwrap();

    let booking = BookPaymentService::new(
        store.clone(),
        id_source,
        Arc::new(StaticVerifier::approving()),
    );
    booking
        .book_payment(PaymentId::new(1), paypal_booking("8RT-100"))
        .await
        .unwrap();

    // Next cycle: the follow-up write fails, the parent write already went
    // through, and no child payment is left behind.
    let result = booking
        .book_payment(PaymentId::new(1), paypal_booking("8RT-101"))
        .await;
    assert!(matches!(result, Err(PaymentError::Port(_))));

    let orphans = store.find_follow_ups(PaymentId::new(1)).await.unwrap();
    assert!(orphans.is_empty());
    assert!(store.get_payment(PaymentId::new(1)).await.unwrap().is_booked());
}

#[tokio::test]
async fn test_replayed_transaction_id_is_rejected_on_booking() {
    init_test_logging();
    let store = Arc::new(InMemoryPaymentStore::new());
    let id_source = Arc::new(SequentialIdSource::new());
    let service = create_service(store.clone());

    let first = service
        .create_payment(paypal_request(900, PaymentInterval::Monthly))
        .await
        .unwrap();
    let second = service
        .create_payment(paypal_request(900, PaymentInterval::Monthly))
        .await
        .unwrap();

    let booking = BookPaymentService::new(
        store.clone(),
        id_source,
        Arc::new(StaticVerifier::approving()),
    );
    booking
        .book_payment(first.payment_id, paypal_booking("8RT-008"))
        .await
        .unwrap();

    let replay = booking
        .book_payment(second.payment_id, paypal_booking("8RT-008"))
        .await;
    assert!(matches!(
        replay,
        Err(PaymentError::InvalidStateTransition(_))
    ));
}

#[tokio::test]
async fn test_cancel_and_restore_direct_debit() {
    init_test_logging();
    let store = Arc::new(InMemoryPaymentStore::new());
    let created = create_service(store.clone())
        .create_payment(CreatePaymentRequest {
            amount_in_cents: 1500,
            interval: PaymentInterval::Quarterly,
            kind: NewPaymentKind::DirectDebit {
                iban: valid_iban().as_str().to_string(),
                bic: "COBADEFFXXX".to_string(),
            },
        })
        .await
        .unwrap();

    let service = CancelPaymentService::new(store.clone());
    let cancelled = service.cancel_payment(created.payment_id).await.unwrap();
    assert!(!cancelled.is_completed);
    assert!(store
        .get_payment(created.payment_id)
        .await
        .unwrap()
        .is_cancelled());

    service.restore_payment(created.payment_id).await.unwrap();
    assert!(!store
        .get_payment(created.payment_id)
        .await
        .unwrap()
        .is_cancelled());
}

#[tokio::test]
async fn test_cancel_rejects_non_cancellable_payment() {
    init_test_logging();
    let payment = TestPaymentBuilder::new().with_id(7).build_credit_card();
    let store = Arc::new(InMemoryPaymentStore::with_payments(vec![payment]).await);

    let result = CancelPaymentService::new(store)
        .cancel_payment(PaymentId::new(7))
        .await;
    assert!(matches!(
        result,
        Err(PaymentError::InvalidStateTransition(_))
    ));
}

#[tokio::test]
async fn test_cancel_missing_payment_is_domain_not_found() {
    init_test_logging();
    let store = Arc::new(InMemoryPaymentStore::new());
    let result = CancelPaymentService::new(store)
        .cancel_payment(PaymentId::new(404))
        .await;
    assert!(matches!(result, Err(PaymentError::NotFound(id)) if id == PaymentId::new(404)));
}

#[tokio::test]
async fn test_bank_transfer_creation_assigns_unique_reference_codes() {
    init_test_logging();
    let store = Arc::new(InMemoryPaymentStore::new());
    let service = create_service(store.clone());

    let request = CreatePaymentRequest {
        amount_in_cents: 5000,
        interval: PaymentInterval::OneTime,
        kind: NewPaymentKind::BankTransfer {
            code_prefix: "XW".to_string(),
        },
    };
    let first = service.create_payment(request.clone()).await.unwrap();
    let second = service.create_payment(request).await.unwrap();

    let first_code = first.reference_code.unwrap();
    let second_code = second.reference_code.unwrap();
    assert!(first_code.starts_with("XW-"));
    assert_ne!(first_code, second_code);

    let persisted = store.get_payment(first.payment_id).await.unwrap();
    assert_eq!(
        persisted.reference_code().map(|code| code.formatted()),
        Some(first_code)
    );
}

#[tokio::test]
async fn test_get_payment_enriches_bank_data() {
    init_test_logging();
    let payment = TestPaymentBuilder::new().with_id(3).build_direct_debit();
    let store = Arc::new(InMemoryPaymentStore::with_payments(vec![payment]).await);

    let service = GetPaymentService::new(store, Arc::new(StaticBankDataEnricher));
    let info = service.get_payment(PaymentId::new(3)).await.unwrap();

    assert_eq!(info.kind, PaymentKind::DirectDebit);
    assert!(!info.is_booked);
    assert!(info.iban.is_some());
    let bank_data = info.bank_data.expect("direct debit should carry bank data");
    assert_eq!(bank_data.bic, "COBADEFFXXX");
}

#[tokio::test]
async fn test_get_missing_payment_propagates_not_found() {
    init_test_logging();
    let store = Arc::new(InMemoryPaymentStore::new());
    let service = GetPaymentService::new(store, Arc::new(StaticBankDataEnricher));
    let result = service.get_payment(PaymentId::new(404)).await;
    assert!(result.unwrap_err().is_not_found());
}
